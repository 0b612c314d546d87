//! Builds the page script for one scrape.
//!
//! The script runs inside the target tab as a single async IIFE and walks
//! the five phases in order: locate the input surface, inject the prompt,
//! trigger submission, wait out streaming, extract the response. Every
//! phase degrades through its fallback cascade instead of throwing; the
//! script always resolves to a string, with the reserved sentinels standing
//! in for failure.

use crate::scraper::selectors::{EditorInput, ExtractTier, SelectorSet, SubmitLocator};
use crate::scraper::timing::WaitPlan;

/// Render the full five-phase script for one site.
pub fn render(set: &SelectorSet, plan: &WaitPlan, prompt: &str) -> String {
    let mut js = String::with_capacity(4096);

    js.push_str("(async () => {\n");
    js.push_str("  const sleep = (ms) => new Promise((r) => setTimeout(r, ms));\n");
    js.push_str("  const textOf = (el) => ((el && el.innerText) || '').trim();\n");
    js.push_str(&format!("  const prompt = {};\n", js_str(prompt)));

    push_input_phase(&mut js, set);
    push_submit_phase(&mut js, set, plan);
    push_wait_phase(&mut js, set, plan);
    push_extract_phase(&mut js, set);

    js.push_str(&format!(
        "  return responseText || {};\n",
        js_str(set.no_response_sentinel)
    ));
    js.push_str("})()");
    js
}

/// Phases 1 and 2: find the input surface, most specific first, and inject
/// the prompt into whichever tier matched. Only total failure here is
/// fatal for the scrape.
fn push_input_phase(js: &mut String, set: &SelectorSet) {
    let EditorInput {
        paragraph_selectors,
        container_selector,
        closest_container,
        strip_classes,
        set_html,
        fire_change,
    } = set.editor;

    js.push_str("  let surface = null;\n");
    js.push_str(&format!(
        "  let editor = [{}].map((sel) => document.querySelector(sel)).find((el) => el);\n",
        js_str_list(paragraph_selectors)
    ));
    js.push_str("  if (editor) {\n");
    if set_html {
        js.push_str("    editor.innerHTML = prompt;\n");
    } else {
        js.push_str("    editor.textContent = prompt;\n");
    }
    for class in strip_classes {
        js.push_str(&format!("    editor.classList.remove({});\n", js_str(class)));
    }
    js.push_str("    const eventTargets = [editor];\n");
    if let Some(container) = container_selector {
        js.push_str(&format!(
            "    const container = document.querySelector({});\n",
            js_str(container)
        ));
        js.push_str("    if (container) eventTargets.push(container);\n");
    }
    if let Some(closest) = closest_container {
        js.push_str(&format!(
            "    const container = editor.closest({});\n",
            js_str(closest)
        ));
        js.push_str("    if (container) eventTargets.push(container);\n");
    }
    js.push_str("    for (const el of eventTargets) {\n");
    js.push_str("      el.dispatchEvent(new Event('input', { bubbles: true }));\n");
    if fire_change {
        js.push_str("      el.dispatchEvent(new Event('change', { bubbles: true }));\n");
    }
    js.push_str("    }\n");
    js.push_str("    editor.focus();\n");
    js.push_str("    surface = editor;\n");
    js.push_str("  }\n");

    // Middle tier: the editor container itself, when the paragraph node
    // is absent (fresh conversation, markup shift).
    if let Some(container) = container_selector {
        js.push_str("  if (!surface) {\n");
        js.push_str(&format!(
            "    const container = document.querySelector({});\n",
            js_str(container)
        ));
        js.push_str("    if (container) {\n");
        js.push_str("      container.textContent = prompt;\n");
        js.push_str("      container.dispatchEvent(new Event('input', { bubbles: true }));\n");
        js.push_str("      container.focus();\n");
        js.push_str("      surface = container;\n");
        js.push_str("    }\n");
        js.push_str("  }\n");
    }

    js.push_str("  if (!surface) {\n");
    js.push_str(&format!(
        "    const field = document.querySelector({});\n",
        js_str(set.input_fallback)
    ));
    js.push_str("    if (!field) return 'Input box not found';\n");
    js.push_str("    field.value = prompt;\n");
    js.push_str("    field.dispatchEvent(new Event('input', { bubbles: true }));\n");
    js.push_str("    field.focus();\n");
    js.push_str("    surface = field;\n");
    js.push_str("  }\n");
}

/// Phase 3: click the first usable submit control, falling back to a full
/// synthetic Enter sequence, then a delayed best-effort retry for a button
/// that enabled late.
fn push_submit_phase(js: &mut String, set: &SelectorSet, plan: &WaitPlan) {
    js.push_str("  let submit = null;\n");
    for locator in set.submit {
        match locator {
            SubmitLocator::Css(sel) => {
                js.push_str(&format!(
                    "  if (!submit) submit = document.querySelector({});\n",
                    js_str(sel)
                ));
            }
            SubmitLocator::IconButton(sel) => {
                js.push_str("  if (!submit) {\n");
                js.push_str(&format!(
                    "    const icon = document.querySelector({});\n",
                    js_str(sel)
                ));
                js.push_str("    if (icon) submit = icon.closest('button');\n");
                js.push_str("  }\n");
            }
            SubmitLocator::EnabledSendButton => {
                js.push_str(
                    "  if (!submit) submit = Array.from(document.querySelectorAll('button:not([disabled])'))\n    .find((btn) => (btn.textContent || '').includes('Send') || ((btn.getAttribute('aria-label') || '').includes('Send')));\n",
                );
            }
        }
    }

    js.push_str(&format!("  await sleep({});\n", plan.settle_ms));
    js.push_str("  if (submit && !submit.disabled) {\n");
    js.push_str("    submit.click();\n");
    js.push_str("  } else {\n");
    // Some frameworks only react to one of the three key events, so the
    // whole sequence is dispatched.
    js.push_str("    for (const type of ['keydown', 'keypress', 'keyup']) {\n");
    js.push_str(
        "      surface.dispatchEvent(new KeyboardEvent(type, { key: 'Enter', keyCode: 13, which: 13, bubbles: true, cancelable: true, composed: true }));\n",
    );
    js.push_str("    }\n");
    js.push_str("  }\n");

    js.push_str(&format!("  await sleep({});\n", plan.retry_delay_ms));
    js.push_str(&format!(
        "  const lateSubmit = document.querySelector({});\n",
        js_str(set.submit_retry)
    ));
    js.push_str("  if (lateSubmit) lateSubmit.click();\n");
}

/// Phase 4: give the page time to start rendering, then poll the busy
/// indicators until they clear or the ceiling is hit.
fn push_wait_phase(js: &mut String, set: &SelectorSet, plan: &WaitPlan) {
    let initial = set.initial_wait_ms.unwrap_or(plan.initial_wait_ms);
    let max_polls = set.max_polls.unwrap_or(plan.max_polls);

    js.push_str(&format!("  await sleep({});\n", initial));
    if !set.busy_indicators.is_empty() && max_polls > 0 {
        js.push_str(&format!(
            "  const busySelectors = [{}];\n",
            js_str_list(set.busy_indicators)
        ));
        js.push_str(&format!(
            "  for (let attempt = 0; attempt < {}; attempt++) {{\n",
            max_polls
        ));
        js.push_str("    if (!busySelectors.some((sel) => document.querySelector(sel))) break;\n");
        js.push_str(&format!("    await sleep({});\n", plan.poll_interval_ms));
        js.push_str("  }\n");
    }
}

/// Phase 5: the tiered extraction cascade. First tier to produce text wins.
fn push_extract_phase(js: &mut String, set: &SelectorSet) {
    js.push_str("  let responseText = '';\n");
    for tier in set.extract {
        match tier {
            ExtractTier::LastMatch { selector } => {
                js.push_str("  if (!responseText) {\n");
                js.push_str(&format!(
                    "    const nodes = document.querySelectorAll({});\n",
                    js_str(selector)
                ));
                js.push_str(
                    "    if (nodes.length > 0) responseText = textOf(nodes[nodes.length - 1]);\n",
                );
                js.push_str("  }\n");
            }
            ExtractTier::JoinParagraphs { container } => {
                js.push_str("  if (!responseText) {\n");
                js.push_str(&format!(
                    "    const container = document.querySelector({});\n",
                    js_str(container)
                ));
                js.push_str("    if (container) {\n");
                js.push_str(
                    "      const parts = Array.from(container.querySelectorAll('p')).map(textOf).filter((t) => t);\n",
                );
                js.push_str("      if (parts.length > 0) responseText = parts.join('\\n\\n');\n");
                js.push_str("    }\n");
                js.push_str("  }\n");
            }
            ExtractTier::RecentScan {
                selector,
                min_len,
                reject_phrases,
            } => {
                js.push_str("  if (!responseText) {\n");
                js.push_str(&format!(
                    "    const nodes = Array.from(document.querySelectorAll({})).slice(-10);\n",
                    js_str(selector)
                ));
                js.push_str(&format!(
                    "    const rejects = [{}];\n",
                    js_str_list(reject_phrases)
                ));
                js.push_str("    for (let i = nodes.length - 1; i >= 0; i--) {\n");
                js.push_str("      const text = textOf(nodes[i]);\n");
                js.push_str(&format!(
                    "      if (text.length > {} && !rejects.some((p) => text.includes(p))) {{ responseText = text; break; }}\n",
                    min_len
                ));
                js.push_str("    }\n");
                js.push_str("  }\n");
            }
            ExtractTier::DivSweep {
                window,
                min_len,
                reject_phrases,
            } => {
                js.push_str("  if (!responseText) {\n");
                js.push_str("    const divs = Array.from(document.querySelectorAll('div'));\n");
                js.push_str(&format!(
                    "    const rejects = [{}];\n",
                    js_str_list(reject_phrases)
                ));
                js.push_str(&format!(
                    "    for (let i = divs.length - 1; i >= Math.max(0, divs.length - {}); i--) {{\n",
                    window
                ));
                js.push_str("      const text = textOf(divs[i]);\n");
                js.push_str(&format!("      if (text.length < {}) continue;\n", min_len));
                js.push_str("      if (rejects.some((p) => text.includes(p))) continue;\n");
                js.push_str("      if (divs[i].querySelector('button, input, textarea')) continue;\n");
                js.push_str("      responseText = text;\n");
                js.push_str("      break;\n");
                js.push_str("    }\n");
                js.push_str("  }\n");
            }
        }
    }
}

/// Render a Rust string as a JS string literal, escaping quotes, backslashes
/// and control characters.
fn js_str(s: &str) -> String {
    serde_json::Value::String(s.to_string()).to_string()
}

fn js_str_list(items: &[&str]) -> String {
    items.iter().map(|s| js_str(s)).collect::<Vec<_>>().join(", ")
}

use introspector_core::constants::session::{ASSISTANT_LABEL, USER_LABEL};
use introspector_core::{NoteDraft, Role};

/// Render a captured session as a markdown note.
pub fn render_note(draft: &NoteDraft) -> String {
    let insights = bullet_list(&draft.summary.insights);
    let links = bullet_list(&draft.summary.links);

    let conversation = draft
        .transcript
        .iter()
        .map(|m| {
            let speaker = match m.role {
                Role::User => USER_LABEL,
                Role::Assistant => ASSISTANT_LABEL,
            };
            format!("**{speaker}**: {}", m.content)
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "# Introspection - {date}

## Opening

{opening}

## Insights

{insights}

## Related Notes

{links}

---

<details>
<summary>Full Conversation ({style})</summary>

{conversation}

</details>
",
        date = draft.date(),
        opening = draft.opening_text.trim(),
        style = draft.style.label(),
    )
}

fn bullet_list(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("- {item}"))
        .collect::<Vec<_>>()
        .join("\n")
}

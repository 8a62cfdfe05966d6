use matryoshka_archive::Outcome;

/// How many rejected prefixes make it into the final report.
const TOP_PREFIXES: usize = 20;

pub fn log_outcome(outcome: &Outcome) {
    let diagnostics = &outcome.diagnostics;
    tracing::info!(
        entries = outcome.entries_emitted,
        levels_failed = outcome.levels_failed,
        store_failures = outcome.store_failures,
        "finished"
    );
    tracing::info!("ignored mime types: {}", ignored_mime_types(outcome));
    tracing::info!("rejected prefixes: {}", rejected_prefixes(outcome));
    if !diagnostics.explored_inner().is_empty() {
        tracing::debug!(inner = ?diagnostics.explored_inner(), "archives found under compression");
    }
}

fn ignored_mime_types(outcome: &Outcome) -> String {
    let types: Vec<_> = outcome.diagnostics.ignored_mime_types().iter().map(String::as_str).collect();
    format!("{{{}}}", types.join(", "))
}

fn rejected_prefixes(outcome: &Outcome) -> String {
    let counted: Vec<_> = outcome
        .diagnostics
        .top_rejected_prefixes(TOP_PREFIXES)
        .into_iter()
        .map(|(prefix, count)| format!("\"{prefix}\": {count}"))
        .collect();
    format!("{{{}}}", counted.join(", "))
}

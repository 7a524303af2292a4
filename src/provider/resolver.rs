#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    #[error("no provider found in artifact")]
    NoProviderFound,
    #[error("multiple providers found in artifact: {}", .candidates.join(", "))]
    AmbiguousProvider { candidates: Vec<String> },
}

/// Picks the single provider class. More than one candidate is refused rather
/// than guessed at.
pub fn resolve_provider(candidates: &[String]) -> Result<String, ResolveError> {
    match candidates {
        [] => Err(ResolveError::NoProviderFound),
        [only] => Ok(only.clone()),
        many => Err(ResolveError::AmbiguousProvider {
            candidates: many.to_vec(),
        }),
    }
}

//! Outcome of resolving a compiler together with its plugins

use protoloc_errors::ResolutionError;
use protoloc_types::ResolvedExecutable;

/// One named descriptor and what resolving it produced
#[derive(Debug, Clone)]
pub struct ToolOutcome {
    pub name: String,
    pub outcome: Result<ResolvedExecutable, ResolutionError>,
}

impl ToolOutcome {
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Every outcome of a toolchain resolution, in descriptor order
///
/// Failures of individual plugins do not hide the others; callers that only
/// care about the first failure use [`ResolvedToolchain::into_result`].
#[derive(Debug, Clone)]
pub struct ResolvedToolchain {
    pub compiler: ToolOutcome,
    pub plugins: Vec<ToolOutcome>,
}

impl ResolvedToolchain {
    /// Compiler first, then plugins as declared
    pub fn outcomes(&self) -> impl Iterator<Item = &ToolOutcome> {
        std::iter::once(&self.compiler).chain(self.plugins.iter())
    }

    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.outcomes().filter(|tool| tool.is_ok()).count()
    }

    #[must_use]
    pub fn failed(&self) -> usize {
        self.outcomes().filter(|tool| !tool.is_ok()).count()
    }

    /// Collapse into resolved executables, keeping names
    ///
    /// # Errors
    ///
    /// Returns the first error in descriptor order.
    pub fn into_result(
        self,
    ) -> Result<(ResolvedExecutable, Vec<(String, ResolvedExecutable)>), ResolutionError> {
        let compiler = self.compiler.outcome?;
        let plugins = self
            .plugins
            .into_iter()
            .map(|tool| tool.outcome.map(|resolved| (tool.name, resolved)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok((compiler, plugins))
    }
}

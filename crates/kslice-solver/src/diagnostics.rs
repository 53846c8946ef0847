use derive_more::Display;

/// Non-fatal findings. Every one of these is returned to the caller, none are only logged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display)]
pub enum Diagnostic {
    #[display("{option}: recursive dependency, evaluated as n")]
    CycleDetected { option: String },

    #[display("seed {option} cannot be enabled: `{expression}` is n")]
    BlockedSeed { option: String, expression: String },

    #[display("{option} (needed by {required_by}) cannot be enabled: `{expression}` is n")]
    Blocked {
        option: String,
        expression: String,
        required_by: String,
    },

    #[display("{option} selected by {selected_by} without meeting `{expression}`")]
    UnmetDependency {
        option: String,
        expression: String,
        selected_by: String,
    },

    #[display("seed {name} is not a known option")]
    UnknownSeed { name: String },

    #[display("choice {choice}: {} are all enabled", members.join(", "))]
    ChoiceConflict { choice: String, members: Vec<String> },

    #[display("{symbol} (referenced by {referenced_by}) is never declared, treated as n")]
    UndefinedSymbol {
        symbol: String,
        referenced_by: String,
    },
}

impl Diagnostic {
    /// The option the finding is about.
    pub fn subject(&self) -> &str {
        match self {
            Diagnostic::CycleDetected { option }
            | Diagnostic::BlockedSeed { option, .. }
            | Diagnostic::Blocked { option, .. }
            | Diagnostic::UnmetDependency { option, .. } => option,
            Diagnostic::UnknownSeed { name } => name,
            Diagnostic::ChoiceConflict { choice, .. } => choice,
            Diagnostic::UndefinedSymbol { symbol, .. } => symbol,
        }
    }
}

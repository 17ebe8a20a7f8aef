use std::fmt;

#[derive(Debug)]
pub enum CoreError {
    /// `set_current_page`/`get_page` with a name absent from the registry
    UnknownPage { page: String, step: Option<String> },

    /// `get_current_page` called before any `set_current_page`
    NoActivePage { step: Option<String> },

    /// Every original candidate plus the one healing pass was exhausted
    SelectorResolution {
        element: String,
        step: Option<String>,
        attempted: Vec<String>,
    },

    /// A collaborator (AI backend, browser bridge) was unreachable
    Transport { target: String, detail: String },

    /// Transport retries exhausted during artifact generation
    Generation { detail: String },

    /// The driver found the element but the action itself failed
    DriverAction {
        action: String,
        element: String,
        step: Option<String>,
        detail: String,
    },

    /// InstructionSet document failed validation
    InvalidInstruction { field: String, detail: String },

    /// Browser bridge subprocess failed to spawn
    SubprocessSpawn { script: String, source: std::io::Error },

    /// Browser bridge protocol violation (bad response, process died)
    SessionProtocol { command: String, detail: String },

    /// JSON parsing failed (bridge output or stored document)
    JsonParse { context: String, source: serde_json::Error },

    /// YAML parsing failed (instruction document or config)
    YamlParse { context: String, source: serde_yaml::Error },

    /// Filesystem failure while reading inputs or writing artifacts
    Io { context: String, source: std::io::Error },
}

impl CoreError {
    /// Attach the originating step name to errors raised during step
    /// execution. No-op for kinds that don't carry one.
    pub fn with_step(mut self, step_name: &str) -> Self {
        match &mut self {
            CoreError::UnknownPage { step, .. }
            | CoreError::NoActivePage { step }
            | CoreError::SelectorResolution { step, .. }
            | CoreError::DriverAction { step, .. } => {
                if step.is_none() {
                    *step = Some(step_name.to_string());
                }
            }
            _ => {}
        }
        self
    }
}

fn step_suffix(step: &Option<String>) -> String {
    match step {
        Some(s) => format!(" (step: '{}')", s),
        None => String::new(),
    }
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoreError::UnknownPage { page, step } => {
                write!(f, "Unknown page '{}'{}", page, step_suffix(step))
            }
            CoreError::NoActivePage { step } => {
                write!(
                    f,
                    "No active page: set_current_page was never called{}",
                    step_suffix(step)
                )
            }
            CoreError::SelectorResolution {
                element,
                step,
                attempted,
            } => {
                write!(
                    f,
                    "Could not resolve element '{}'{}; attempted selectors: [{}]",
                    element,
                    step_suffix(step),
                    attempted.join(", ")
                )
            }
            CoreError::Transport { target, detail } => {
                write!(f, "Transport failure reaching {}: {}", target, detail)
            }
            CoreError::Generation { detail } => {
                write!(f, "Generation failed: {}", detail)
            }
            CoreError::DriverAction {
                action,
                element,
                step,
                detail,
            } => {
                write!(
                    f,
                    "Driver action '{}' on '{}' failed{}: {}",
                    action,
                    element,
                    step_suffix(step),
                    detail
                )
            }
            CoreError::InvalidInstruction { field, detail } => {
                write!(f, "Invalid instruction set ({}): {}", field, detail)
            }
            CoreError::SubprocessSpawn { script, source } => {
                write!(f, "Failed to spawn {} (is Node.js installed?): {}", script, source)
            }
            CoreError::SessionProtocol { command, detail } => {
                write!(f, "Browser bridge '{}' failed: {}", command, detail)
            }
            CoreError::JsonParse { context, source } => {
                write!(f, "JSON parse error ({}): {}", context, source)
            }
            CoreError::YamlParse { context, source } => {
                write!(f, "YAML parse error ({}): {}", context, source)
            }
            CoreError::Io { context, source } => {
                write!(f, "I/O error ({}): {}", context, source)
            }
        }
    }
}

impl std::error::Error for CoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CoreError::SubprocessSpawn { source, .. } => Some(source),
            CoreError::JsonParse { source, .. } => Some(source),
            CoreError::YamlParse { source, .. } => Some(source),
            CoreError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

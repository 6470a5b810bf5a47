//! Fixed rulesets handed to the conversation runtime.

use agent_provider::{Rule, Ruleset};

pub const ASSISTANT_NAME: &str = "Em";
pub const USER_NAME: &str = "Jacob";

/// Scripted opening instruction sent before the first prompt.
pub const GREETING_INSTRUCTION: &str = "Greet Jacob.";

pub const PERSONA_RULESET_NAME: &str = "sys_ruleset";
pub const FORMAT_RULESET_NAME: &str = "json_ruleset";

/// Identity and tone.
pub fn persona_ruleset() -> Ruleset {
    Ruleset::new(
        PERSONA_RULESET_NAME,
        vec![Rule::new(
            "You are a helpful AI assistant named Em. You are here to help Jacob with any \
             questions he may have. !Important- Please don't use disclaimers like: 'As an AI...' \
             Just answer the questions in a direct and friendly manner. If you don't know the \
             answer, just say something like: 'I would need to do more research on that subject \
             to give you an accurate answer.'",
        )],
    )
}

/// Output envelope contract parsed by [`crate::envelope::parse_envelope`].
pub fn format_ruleset() -> Ruleset {
    Ruleset::new(
        FORMAT_RULESET_NAME,
        vec![
            Rule::new(
                "Respond in plain text only with JSON objects that have the following keys: \
                 response, continue_chatting.",
            ),
            Rule::new(
                "The 'response' value should be a string that can be safely converted to \
                 markdown format. Include line returns when necessary.",
            ),
            Rule::new(
                "If it sounds like the person is done chatting, set 'continue_chatting' to \
                 false, otherwise it is true.",
            ),
        ],
    )
}

/// Persona first, then format.
pub fn default_rulesets() -> Vec<Ruleset> {
    vec![persona_ruleset(), format_ruleset()]
}

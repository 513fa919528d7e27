//! The four crew roles.

use crate::config::Prompts;
use crate::tools::ToolKind;

/// A crew role. Roles differ only in instructions, tool and output shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    ScriptWriter,
    VoiceActor,
    GraphicDesigner,
    Director,
}

impl Role {
    /// All roles in turn order.
    pub const ALL: [Role; 4] = [
        Role::ScriptWriter,
        Role::VoiceActor,
        Role::GraphicDesigner,
        Role::Director,
    ];

    /// Stable speaker identity.
    pub fn name(&self) -> &'static str {
        match self {
            Role::ScriptWriter => "script_writer",
            Role::VoiceActor => "voice_actor",
            Role::GraphicDesigner => "graphic_designer",
            Role::Director => "director",
        }
    }

    /// The tool this role may call, if any.
    pub fn tool(&self) -> Option<ToolKind> {
        match self {
            Role::ScriptWriter => None,
            Role::VoiceActor => Some(ToolKind::Voiceovers),
            Role::GraphicDesigner => Some(ToolKind::Images),
            Role::Director => Some(ToolKind::Video),
        }
    }

    /// Whether replies must follow the script schema.
    pub fn wants_structured_output(&self) -> bool {
        matches!(self, Role::ScriptWriter)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A role bound to its rendered system prompt.
#[derive(Debug, Clone, PartialEq)]
pub struct RoleAgent {
    pub role: Role,
    pub instructions: String,
}

impl RoleAgent {
    pub fn new(role: Role, instructions: impl Into<String>) -> Self {
        Self {
            role,
            instructions: instructions.into(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.role.name()
    }

    /// Build the full crew, in turn order, from the prompt templates.
    pub fn crew(prompts: &Prompts, termination_token: &str) -> Vec<RoleAgent> {
        Role::ALL
            .iter()
            .map(|&role| {
                let template = match role {
                    Role::ScriptWriter => &prompts.roles.script_writer,
                    Role::VoiceActor => &prompts.roles.voice_actor,
                    Role::GraphicDesigner => &prompts.roles.graphic_designer,
                    Role::Director => &prompts.roles.director,
                };
                RoleAgent::new(role, prompts.render_with_builtins(template, termination_token))
            })
            .collect()
    }
}

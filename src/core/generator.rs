use crate::domain::model::{ContentContext, MessageKind};
use crate::domain::ports::DynContentBackend;

/// Personalized copy from an ordered chain of AI back-ends, with a static
/// template when every back-end fails. `generate` never errors and never
/// returns an empty string.
#[derive(Clone)]
pub struct ContentGenerator {
    welcome_chain: Vec<DynContentBackend>,
    daily_chain: Vec<DynContentBackend>,
}

impl ContentGenerator {
    pub fn new(welcome_chain: Vec<DynContentBackend>, daily_chain: Vec<DynContentBackend>) -> Self {
        Self {
            welcome_chain,
            daily_chain,
        }
    }

    pub fn chain_for(&self, kind: MessageKind) -> &[DynContentBackend] {
        match kind {
            MessageKind::Welcome => &self.welcome_chain,
            MessageKind::Daily => &self.daily_chain,
        }
    }

    pub async fn generate(&self, kind: MessageKind, context: &ContentContext) -> String {
        let prompt = build_prompt(kind, context);

        for backend in self.chain_for(kind) {
            match backend.complete(&prompt).await {
                Ok(text) if !text.trim().is_empty() => {
                    tracing::debug!("{} content generated by {}", kind, backend.name());
                    return text.trim().to_string();
                }
                Ok(_) => {
                    tracing::warn!("{} returned empty {} content", backend.name(), kind);
                }
                Err(e) => {
                    tracing::warn!("{} could not generate {} content: {}", backend.name(), kind, e);
                }
            }
        }

        tracing::warn!("Using static {} content for {}", kind, context.name);
        fallback_text(kind, context)
    }
}

pub fn build_prompt(kind: MessageKind, context: &ContentContext) -> String {
    match kind {
        MessageKind::Welcome => format!(
            "Escribe un mensaje de bienvenida personalizado para {name} que se unió a Vision Board 2026 con estos objetivos: \"{goals}\".\n\
             \n\
             El mensaje debe:\n\
             1. Dar una cálida bienvenida\n\
             2. Reconocer sus objetivos específicos\n\
             3. Dar un consejo práctico para empezar hoy\n\
             4. Ser motivador y optimista\n\
             \n\
             Máximo 100 palabras. Español.",
            name = context.name,
            goals = context.goals,
        ),
        MessageKind::Daily => format!(
            "Hoy es {day}. Eres un coach de productividad.\n\
             \n\
             El usuario {name} tiene estos objetivos: \"{goals}\"\n\
             \n\
             Genera:\n\
             1. Un saludo motivacional (1 oración)\n\
             2. Una tarea concreta para hoy (máximo 15 minutos)\n\
             3. Un consejo práctico\n\
             4. Una pregunta para reflexionar\n\
             \n\
             Usa **negritas** para lo importante. Máximo 120 palabras. Español.",
            day = context.day_name.as_deref().unwrap_or("hoy"),
            name = context.name,
            goals = context.goals,
        ),
    }
}

/// Deterministic copy for when no back-end answers.
pub fn fallback_text(kind: MessageKind, context: &ContentContext) -> String {
    match kind {
        MessageKind::Welcome => format!(
            "¡Hola {}! Bienvenido/a a Vision Board 2026. Estamos emocionados de acompañarte en el logro de tus objetivos: \"{}\". Tu primer paso hoy: dedica 15 minutos a planificar tu semana. ¡Vamos!",
            context.name, context.goals
        ),
        MessageKind::Daily => {
            let excerpt: String = context.goals.chars().take(50).collect();
            format!(
                "**¡Buen día {}!** 🌅\n\n**Tarea de hoy:** Dedica 10 minutos a avanzar en: \"{}...\"\n\n**Consejo:** La constancia supera a la intensidad.\n\n**Pregunta:** ¿Qué pequeño paso puedes dar hoy?",
                context.name, excerpt
            )
        }
    }
}

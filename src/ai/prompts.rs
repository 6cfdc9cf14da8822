//! Prompt text sent to the chat-completion endpoint

/// System instruction keeping answers grounded in the fetched mail
pub const EMAIL_ASSISTANT_SYSTEM: &str = "You are an assistant helping a user with their recent emails. Only use the provided email context.";

/// User turn: the context block followed by the literal question
pub fn question_with_context(context: &str, question: &str) -> String {
    format!(
        "Here are the recent emails:\n\n{}\n\nUser Question: {}\n",
        context, question
    )
}

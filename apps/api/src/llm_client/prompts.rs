// Shared prompt fragments.
// Each service that needs LLM calls defines its own prompts.rs alongside it.
// This file contains cross-cutting prompt fragments.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Appended to every prompt that answers from retrieved resume text.
pub const GROUNDING_INSTRUCTION: &str = "\
    Use ONLY the resume passages provided. \
    Do not hallucinate or make up candidate details. \
    If the passages do not support an answer, say that you don't know. \
    Always mention the candidate name if available in the source.";

//! Outbound message assembly
//!
//! In injected-context mode the message is built from prior results and the
//! new instruction:
//!
//! ```text
//! === STEP 1 OUTPUT ===
//! <result 1>
//! === END STEP 1 OUTPUT ===
//!
//! === INSTRUCTION ===
//! <prompt>
//! ```

use super::InstructionMode;

/// Build the message sent for a step.
///
/// `prior_results` are the results of the preceding steps in chain order.
/// The output depends on nothing else.
pub fn assemble_message(prior_results: &[&str], prompt: &str, mode: InstructionMode) -> String {
    match mode {
        InstructionMode::Continuation => prompt.to_string(),
        InstructionMode::InjectedContext => inject_context(prior_results, prompt),
    }
}

fn inject_context(prior_results: &[&str], prompt: &str) -> String {
    let mut message = String::new();

    for (i, result) in prior_results.iter().enumerate() {
        let step = i + 1;
        message.push_str(&format!("=== STEP {} OUTPUT ===\n", step));
        message.push_str(result);
        message.push_str(&format!("\n=== END STEP {} OUTPUT ===\n\n", step));
    }

    message.push_str("=== INSTRUCTION ===\n");
    message.push_str(prompt);
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_continuation_sends_prompt_only() {
        let message = assemble_message(&["R1"], "List risks", InstructionMode::Continuation);
        assert_eq!(message, "List risks");
    }

    #[test]
    fn test_injected_context_layout() {
        let message = assemble_message(
            &["Brochure text", "Q: ...A: ..."],
            "Compile HTML",
            InstructionMode::InjectedContext,
        );

        assert_eq!(
            message,
            "=== STEP 1 OUTPUT ===\nBrochure text\n=== END STEP 1 OUTPUT ===\n\n\
             === STEP 2 OUTPUT ===\nQ: ...A: ...\n=== END STEP 2 OUTPUT ===\n\n\
             === INSTRUCTION ===\nCompile HTML"
        );
    }

    #[test]
    fn test_injected_context_ordering() {
        let message = assemble_message(
            &["Brochure text", "Q: ...A: ..."],
            "Compile HTML",
            InstructionMode::InjectedContext,
        );

        let step1 = message.find("STEP 1 OUTPUT").unwrap();
        let r1 = message.find("Brochure text").unwrap();
        let step2 = message.find("STEP 2 OUTPUT").unwrap();
        let r2 = message.find("Q: ...A: ...").unwrap();
        let instruction = message.find("Compile HTML").unwrap();

        assert!(step1 < r1 && r1 < step2 && step2 < r2 && r2 < instruction);
    }

    #[test]
    fn test_injected_context_is_deterministic() {
        let a = assemble_message(&["x", "y"], "z", InstructionMode::InjectedContext);
        let b = assemble_message(&["x", "y"], "z", InstructionMode::InjectedContext);
        assert_eq!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn test_injected_context_without_prior_results() {
        let message = assemble_message(&[], "Summarize", InstructionMode::InjectedContext);
        assert_eq!(message, "=== INSTRUCTION ===\nSummarize");
    }
}

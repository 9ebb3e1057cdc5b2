/// Instruction block shared by every symptom analysis.
const ANALYSIS_INSTRUCTIONS: &str = r#"You are an experienced medical triage assistant. Analyze the reported symptoms carefully and use web search to ground your answer in reputable medical sources.

The VERY FIRST LINE of your response MUST be exactly in this format, with nothing before it:
CONFIDENCE_SCORE: <integer 0-100> | CONFIDENCE_LABEL: <High|Medium|Low>

The score reflects how confident you are in the assessment given the information provided. Use High for 70-100, Medium for 40-69 and Low for 0-39.

After that line, structure the rest of your response in markdown with exactly these sections:

### Summary
A short plain-language summary of what the symptoms suggest.

### Potential Conditions
A bulleted list of possible conditions, most likely first, each with a one-line explanation.

### Urgency Level
One of: Emergency (seek care immediately), Urgent (see a doctor within 24-48 hours), Routine (schedule an appointment), Self-care (monitor at home). Explain why.

### Recommendations
Concrete next steps, self-care measures and warning signs that should prompt immediate medical attention.

End with a clear disclaimer stating that this is not a medical diagnosis and that the user should consult a qualified healthcare professional."#;

/// Build the analysis prompt.
///
/// The language string is passed through verbatim; the model decides what to make of it.
pub fn build_analysis_prompt(symptoms: &str, has_image: bool, language: &str) -> String {
    let symptoms = symptoms.trim();
    let mut prompt = String::from(ANALYSIS_INSTRUCTIONS);

    prompt.push_str("\n\n");
    if symptoms.is_empty() {
        prompt.push_str("The user did not provide a text description of their symptoms.");
    } else {
        prompt.push_str(&format!("Reported symptoms: {}", symptoms));
    }

    if has_image {
        prompt.push_str(
            "\n\nAn image is attached. Examine it for visible symptoms (rashes, swelling, \
             discoloration, wounds or similar) and incorporate what you observe into the analysis.",
        );
    }

    prompt.push_str(&format!(
        "\n\nWrite your ENTIRE response in {language}, except the first CONFIDENCE line, \
         which must stay exactly in the English format shown above."
    ));

    prompt
}

/// Build the doctor-finder prompt. Location bias travels in the request's
/// retrieval config; the prompt only mentions that the search is local.
pub fn build_doctor_prompt(symptoms: &str) -> String {
    let symptoms = symptoms.trim();
    let symptoms = if symptoms.is_empty() {
        "general health concerns"
    } else {
        symptoms
    };

    format!(
        "A person near the provided location is experiencing: {symptoms}\n\n\
         1. Determine which type of medical specialist is most appropriate for these symptoms.\n\
         2. Use map search to find 3-4 highly rated practices or clinics of that specialty near the user's location.\n\
         3. For each provider give the name, the specialty, the rating if available, and a one-sentence reason it is a good fit.\n\n\
         Start with a single line naming the recommended specialist type. Keep the answer concise and formatted as a markdown list.\n\
         Do not provide a diagnosis.",
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analysis_prompt_requires_confidence_line_and_sections() {
        let prompt = build_analysis_prompt("headache and fever", false, "English");
        assert!(prompt.contains("CONFIDENCE_SCORE: <integer 0-100> | CONFIDENCE_LABEL: <High|Medium|Low>"));
        for section in [
            "### Summary",
            "### Potential Conditions",
            "### Urgency Level",
            "### Recommendations",
        ] {
            assert!(prompt.contains(section), "missing {section}");
        }
        assert!(prompt.contains("disclaimer"));
        assert!(prompt.contains("Reported symptoms: headache and fever"));
        assert!(!prompt.contains("An image is attached"));
    }

    #[test]
    fn test_analysis_prompt_with_image_and_no_text() {
        let prompt = build_analysis_prompt("   ", true, "Spanish");
        assert!(prompt.contains("did not provide a text description"));
        assert!(prompt.contains("An image is attached"));
        assert!(prompt.contains("ENTIRE response in Spanish"));
    }

    #[test]
    fn test_analysis_prompt_passes_language_through() {
        let prompt = build_analysis_prompt("cough", false, "Klingon (formal)");
        assert!(prompt.contains("in Klingon (formal)"));
    }

    #[test]
    fn test_doctor_prompt() {
        let prompt = build_doctor_prompt("knee pain after running");
        assert!(prompt.contains("knee pain after running"));
        assert!(prompt.contains("3-4 highly rated"));
        assert!(prompt.contains("specialist"));
    }
}

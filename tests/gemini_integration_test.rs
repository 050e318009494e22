use incident_ai_common::{build_candidate_prompt, parse_verdict};
use incident_ai_rust::analyzer::{GeminiClient, Oracle};

#[tokio::test]
async fn gemini_candidate_integration() {
    let api_key = match std::env::var("GEMINI_API_KEY") {
        Ok(key) if !key.trim().is_empty() => key,
        _ => {
            eprintln!("GEMINI_API_KEY not set; skipping integration test");
            return;
        }
    };

    let client = GeminiClient::new(api_key, "gemini-2.0-flash".into(), 60)
        .expect("client build failed");

    let prompt = build_candidate_prompt(
        "Job de cierre diario cae todas las noches",
        "El job de cierre falla por timeout contra la base de datos desde hace 3 meses",
        "Se hace rerun manual cada mañana",
    );

    let text = client.generate_json(&prompt).await.expect("request failed");
    let verdict = parse_verdict(&text).expect("failed to parse verdict");
    assert!(!verdict.reason.is_empty());
}

//! `rustedtutor doctor` — Diagnose configuration.

use rustedtutor_config::AppConfig;
use rustedtutor_core::retrieval::RetrievalQuery;

pub async fn run() -> anyhow::Result<()> {
    println!("🩺 RustedTutor Doctor");
    println!("=====================\n");

    let mut issues = 0;

    let config_path = AppConfig::config_dir().join("config.toml");
    if config_path.exists() {
        println!("  ✅ Config file found");
    } else {
        println!("  ⚠️  No config file — run `rustedtutor onboard` (env vars still apply)");
    }

    let config = match AppConfig::load() {
        Ok(config) => {
            println!("  ✅ Config valid");
            config
        }
        Err(e) => {
            println!("  ❌ Config invalid: {e}");
            println!("\n  ⚠️  1 issue found.");
            return Ok(());
        }
    };

    if config.has_api_key() {
        println!("  ✅ API key configured for '{}'", config.default_provider);
    } else {
        println!("  ⚠️  No API key configured — set OPENAI_API_KEY or add api_key to config.toml");
        issues += 1;
    }

    let retriever = rustedtutor_memory::build_retriever(&config.retrieval);
    if retriever.name() == "none" {
        println!("  ⚠️  Retrieval disabled — answers will use general knowledge only");
    } else {
        let probe = RetrievalQuery::new("health check", "doctor", 1);
        match retriever.relevant_chunks(&probe).await {
            Ok(_) => println!("  ✅ Retrieval service reachable at {}", config.retrieval.url),
            Err(e) => {
                println!("  ❌ Retrieval service: {e}");
                issues += 1;
            }
        }
    }

    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}

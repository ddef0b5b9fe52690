//! `rustedtutor ask` — Single question or interactive chat.

use rustedtutor_core::tutoring::AnswerResult;
use rustedtutor_tutor::{AnswerRequest, Tutor};
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::Scope;

pub async fn run(question: Option<String>, scope: Scope) -> anyhow::Result<()> {
    let (config, tutor) = super::build_tutor()?;

    if let Some(question) = question {
        eprint!("  Thinking...");
        let result = tutor.answer(&request(&question, &scope)).await?;
        eprint!("\r              \r");
        print_answer(&result);
        return Ok(());
    }

    println!();
    println!("  ╔══════════════════════════════════════════════╗");
    println!("  ║       RustedTutor — Interactive Mode         ║");
    println!("  ╚══════════════════════════════════════════════╝");
    println!();
    println!("  Provider:  {}", config.default_provider);
    println!("  Model:     {}", config.default_model);
    println!("  Student:   {}", scope.user);
    if let Some(material) = &scope.material {
        println!("  Material:  {material}");
    }
    println!();
    println!("  Type your question and press Enter.");
    println!("  Type '/clear' to forget the conversation, 'exit' to quit.");
    println!();

    chat(&tutor, &scope).await?;

    println!();
    println!("  Goodbye! 👋");
    println!();
    Ok(())
}

async fn chat(tutor: &Tutor, scope: &Scope) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    prompt()?;
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        match line {
            "" => {}
            "exit" | "quit" => break,
            "/clear" => {
                tutor.clear_conversation(&scope.user).await?;
                println!("  (conversation cleared)\n");
            }
            question => {
                eprint!("  ...");
                match tutor.answer(&request(question, scope)).await {
                    Ok(result) => {
                        eprint!("\r     \r");
                        println!();
                        print_answer(&result);
                        println!();
                    }
                    Err(e) => {
                        eprint!("\r     \r");
                        eprintln!("  [Error] {e}");
                        println!();
                    }
                }
            }
        }
        prompt()?;
    }
    Ok(())
}

fn request(question: &str, scope: &Scope) -> AnswerRequest {
    AnswerRequest {
        question: question.to_string(),
        user_id: scope.user.clone(),
        material_id: scope.material.clone(),
        use_all_materials: scope.all_materials,
    }
}

fn print_answer(result: &AnswerResult) {
    for line in result.answer.lines() {
        println!("  Tutor > {line}");
    }
    println!("  [{}]", result.mode);
    for source in &result.sources {
        println!("    · ({:.2}) {}", source.similarity, source.content.replace('\n', " "));
    }
}

fn prompt() -> std::io::Result<()> {
    print!("  You > ");
    std::io::stdout().flush()
}

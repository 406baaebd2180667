use std::io::{self, BufRead, Write};
use std::process::ExitCode;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use curio_core::model::{Phase, Session};
use services::{Clock, PerplexityGenerator, QuestionView, QuizConfig, QuizService, SessionView};

type Lines<'a> = io::Lines<io::StdinLock<'a>>;

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  PERPLEXITY_API_KEY    API key (or put it in ./secrets.toml)");
    eprintln!("  CURIO_BASE_URL        generator endpoint override");
    eprintln!("  CURIO_QUESTION_MODEL  model for question generation");
    eprintln!("  CURIO_SUMMARY_MODEL   model for the closing analysis");
}

async fn run(service: &QuizService) -> io::Result<()> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let mut session = service.new_session();

    println!("Curiosity Quiz");

    loop {
        let view = SessionView::from_session(&session);
        let keep_going = match view.phase {
            Phase::Start => start_screen(service, &mut session, &mut lines).await?,
            Phase::Quiz => quiz_screen(service, &mut session, &view, &mut lines).await?,
            Phase::Summary => summary_screen(service, &mut session, &view, &mut lines).await?,
        };
        if !keep_going {
            return Ok(());
        }
    }
}

async fn start_screen(
    service: &QuizService,
    session: &mut Session,
    lines: &mut Lines<'_>,
) -> io::Result<bool> {
    show_error(session);
    let Some(topic) = prompt_line(lines, "\nWhat are you curious about today? ")? else {
        return Ok(false);
    };
    if topic.trim().is_empty() {
        println!("Please enter a topic.");
        return Ok(true);
    }

    println!("Generating first question...");
    // Failure is recorded on the session; the loop re-renders the start
    // screen with the error and the user retries.
    let _ = service.start_quiz(session, &topic).await;
    Ok(true)
}

async fn quiz_screen(
    service: &QuizService,
    session: &mut Session,
    view: &SessionView,
    lines: &mut Lines<'_>,
) -> io::Result<bool> {
    let Some(question) = view.question.as_ref() else {
        // Quiz phase always carries a question; recover by starting over.
        service.restart(session);
        return Ok(true);
    };

    if question.is_answered {
        reveal(question);
        show_error(session);

        let last = view.question_number == view.total_questions;
        let prompt = if last {
            "\nPress Enter to finish the quiz, or type 'restart': "
        } else {
            "\nPress Enter for the next question, or type 'restart': "
        };
        let Some(input) = prompt_line(lines, prompt)? else {
            return Ok(false);
        };
        if input.trim() == "restart" {
            service.restart(session);
            return Ok(true);
        }

        println!(
            "{}",
            if last {
                "Analyzing your results..."
            } else {
                "Generating next question..."
            }
        );
        let _ = service.advance(session).await;
        return Ok(true);
    }

    println!(
        "\nQuestion {} of {}",
        view.question_number, view.total_questions
    );
    println!("{}\n", question.text);
    for (i, option) in question.options.iter().enumerate() {
        println!("  {}. {option}", i + 1);
    }

    let Some(input) = prompt_line(lines, "\nYour answer (1-4): ")? else {
        return Ok(false);
    };
    match parse_choice(&input, question.options.len()) {
        Some(index) => {
            if let Err(err) = service.submit_answer(session, index) {
                println!("{err}");
            }
        }
        None => println!("Please choose a number between 1 and 4."),
    }
    Ok(true)
}

async fn summary_screen(
    service: &QuizService,
    session: &mut Session,
    view: &SessionView,
    lines: &mut Lines<'_>,
) -> io::Result<bool> {
    match &view.summary {
        Some(summary) => {
            println!("\nQuiz Summary\n");
            println!("{summary}");
            let Some(choice) =
                prompt_line(lines, "\n[d]ig deeper, [n]ew quiz, or [q]uit: ")?
            else {
                return Ok(false);
            };
            match choice.trim() {
                "d" => println!("{}", service.dig_deeper()),
                "n" => service.restart(session),
                "q" => return Ok(false),
                _ => println!("Please choose d, n, or q."),
            }
        }
        None => {
            show_error(session);
            let Some(choice) = prompt_line(lines, "\n[r]etry analysis or [n]ew quiz: ")? else {
                return Ok(false);
            };
            match choice.trim() {
                "r" => {
                    println!("Analyzing your results...");
                    let _ = service.advance(session).await;
                }
                "n" => service.restart(session),
                _ => println!("Please choose r or n."),
            }
        }
    }
    Ok(true)
}

fn reveal(question: &QuestionView) {
    let (Some(correct), Some(selected)) = (question.correct_option_index, question.selected_option)
    else {
        return;
    };

    for (i, option) in question.options.iter().enumerate() {
        let mark = if i == correct { "*" } else { " " };
        println!("  {mark} {}. {option}", i + 1);
    }

    let explanation = question.explanation.as_deref().unwrap_or_default();
    if selected == correct {
        println!("\nCorrect! {explanation}");
    } else {
        println!(
            "\nIncorrect. The correct answer was \"{}\". {explanation}",
            question.options[correct]
        );
    }
}

fn show_error(session: &Session) {
    if let Some(message) = session.error() {
        eprintln!("\nError: {message}");
    }
}

fn parse_choice(input: &str, option_count: usize) -> Option<usize> {
    let choice: usize = input.trim().parse().ok()?;
    if choice == 0 || choice > option_count {
        return None;
    }
    Some(choice - 1)
}

fn prompt_line(lines: &mut Lines<'_>, prompt: &str) -> io::Result<Option<String>> {
    print!("{prompt}");
    io::stdout().flush()?;
    match lines.next() {
        Some(line) => Ok(Some(line?)),
        None => Ok(None),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    if std::env::args().skip(1).any(|arg| arg == "--help" || arg == "-h") {
        print_usage();
        return ExitCode::SUCCESS;
    }

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // A missing API key is fatal here, before any session exists.
    let config = match QuizConfig::load() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::from(2);
        }
    };

    let generator = Arc::new(PerplexityGenerator::new(&config));
    let service = QuizService::new(Clock::default_clock(), generator)
        .with_models(config.question_model.clone(), config.summary_model.clone());

    if let Err(err) = run(&service).await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        return ExitCode::from(2);
    }
    ExitCode::SUCCESS
}

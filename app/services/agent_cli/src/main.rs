use app_config::AppConfig;
use app_dto::chat::ConversationMessage;
use app_llm::{ChatModel, OpenAiCompatibleClient};
use app_log::init_tracing;
use app_prompt::build_prompt;
use app_store::open_store;
use dotenv::dotenv;
use std::io::{self, Write};

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    let config = AppConfig::new();
    init_tracing(config.log_level.clone());
    let store = open_store(&config).await?;
    let llm = OpenAiCompatibleClient::new(&config)?;

    // Keep Conversation History
    let mut history: Vec<ConversationMessage> = Vec::new();
    eprintln!(
        "Command console.\nexit\t\tQuit\ndebug\t\tShow conversation history\nclean\t\tClean conversation history"
    );
    // Cli Main Loop
    loop {
        print!("> ");
        io::stdout().flush()?;
        let mut line = String::new();
        if io::stdin().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim().to_string();
        if line.is_empty() {
            continue;
        }

        // Exit
        if line.eq_ignore_ascii_case("exit") {
            break;
        }
        // Show History
        if line.eq_ignore_ascii_case("debug") {
            for h in &history {
                println!("{:#?}", &h);
            }
            continue;
        }
        // Clean History
        if line.eq_ignore_ascii_case("clean") {
            history = Vec::new();
            continue;
        }

        let prompt = build_prompt(store.as_ref(), &line, &history, true, true).await;
        match llm.chat(None, &prompt).await {
            Ok(answer) => {
                println!("{}", &answer);
                history.push(ConversationMessage::user(line));
                history.push(ConversationMessage::assistant(answer));
            }
            // Failed turns stay out of the history.
            Err(e) => eprintln!("Error: {}", e.message),
        }
    }
    Ok(())
}

use clap::{Parser, Subcommand};
use std::process::ExitCode;
use photogenic_studio::{
    build_prompt,
    logger::{self, LoggerConfig},
    studio, Config, FormState, Page, PortraitRequest, SubmissionOutcome, TerminalView,
};

#[derive(Parser)]
#[command(name = "photogenic-studio", version, about = "AI portrait studio")]
struct Cli {
    /// Log at debug level with file locations
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Submit the studio form to a running server and show the result
    Generate {
        /// Text field, repeatable
        #[arg(long = "field", short = 'f', value_name = "NAME=VALUE")]
        fields: Vec<String>,

        /// File field read from disk, repeatable
        #[arg(long = "file", value_name = "NAME=PATH")]
        files: Vec<String>,

        /// Server to post to (defaults to STUDIO_BASE_URL)
        #[arg(long)]
        base_url: Option<String>,

        #[arg(long)]
        no_color: bool,
    },

    /// Print the prompt the server would build for these fields
    Prompt {
        #[arg(long = "field", short = 'f', value_name = "NAME=VALUE")]
        fields: Vec<String>,
    },

    /// Run the generate endpoint and static frontend
    #[cfg(feature = "server")]
    Serve {
        #[arg(long)]
        host: Option<String>,

        #[arg(long)]
        port: Option<u16>,

        #[arg(long)]
        static_dir: Option<String>,
    },
}

async fn read_form(fields: &[String], files: &[String]) -> photogenic_studio::Result<FormState> {
    let mut form = FormState::new();
    for pair in fields {
        let (name, value) = FormState::parse_pair(pair)?;
        form = form.with_text(name, value);
    }
    for pair in files {
        let (name, path) = FormState::parse_pair(pair)?;
        form = form.with_file_path(name, path).await?;
    }
    Ok(form)
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let dotenv_loaded = dotenv::dotenv().is_ok();
    let cli = Cli::parse();

    let logger_config = if cli.verbose {
        LoggerConfig::development()
    } else {
        LoggerConfig::from_env()
    };
    logger::init_with_config(logger_config)?;

    if dotenv_loaded {
        log::debug!(".env file loaded");
    } else {
        log::debug!("No .env file found, using system environment variables");
    }

    let mut config = Config::from_env();
    if cli.verbose {
        logger::log_config_info(&config);
    }

    let code = match cli.command {
        Command::Generate {
            fields,
            files,
            base_url,
            no_color,
        } => {
            if let Some(base_url) = base_url {
                config.studio = config.studio.with_base_url(base_url);
            }
            let form = read_form(&fields, &files).await?;

            let controller = studio::connect(&config.studio, &Page::studio(), |elements| {
                if no_color {
                    TerminalView::new(elements, std::io::stdout(), false)
                } else {
                    TerminalView::stdout(elements)
                }
            })?;

            let outcome = {
                let _timer = logger::timer("Generation");
                controller.submit(&form).await?
            };
            match outcome {
                SubmissionOutcome::Succeeded(_) => ExitCode::SUCCESS,
                SubmissionOutcome::Failed { .. } => ExitCode::FAILURE,
            }
        }
        Command::Prompt { fields } => {
            let form = read_form(&fields, &[]).await?;
            let request = PortraitRequest::from_form(&form);
            let prompt = build_prompt(&request.fields);
            println!("{}", prompt.positive);
            log::debug!("Negative prompt: {}", prompt.negative);
            ExitCode::SUCCESS
        }
        #[cfg(feature = "server")]
        Command::Serve {
            host,
            port,
            static_dir,
        } => {
            if let Some(host) = host {
                config.server = config.server.with_host(host);
            }
            if let Some(port) = port {
                config.server = config.server.with_port(port);
            }
            if let Some(dir) = static_dir {
                config.server = config.server.with_static_dir(dir);
            }
            logger::log_config_info(&config);
            photogenic_studio::server::run(&config).await?;
            ExitCode::SUCCESS
        }
    };

    log::logger().flush();
    Ok(code)
}

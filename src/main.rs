use clap::Parser;
use tax_filer::config::cli::AdviseArgs;
use tax_filer::config::Command;
use tax_filer::core::Field;
use tax_filer::domain::countries;
use tax_filer::utils::{logger, validation::Validate};
use tax_filer::{CliConfig, ClientSettings, FormPhase, SessionEvent, TaxAdvisor, TaxError};

#[tokio::main]
async fn main() {
    let config = CliConfig::parse();

    if config.json_logs {
        logger::init_json_logger(config.verbose);
    } else {
        logger::init_cli_logger(config.verbose);
    }
    tracing::debug!("CLI config: {:?}", config);

    if let Err(e) = run(config).await {
        tracing::error!(
            "❌ tax-filer failed: {} (Severity: {:?})",
            e,
            e.severity()
        );
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());
        std::process::exit(e.exit_code());
    }
}

async fn run(config: CliConfig) -> Result<(), TaxError> {
    match config.command.clone() {
        Command::Countries => {
            for country in countries::sorted_by_name() {
                println!("{:<4} {}", country.code, country.name);
            }
            Ok(())
        }
        Command::Advise(args) => advise(&connect(&config)?, args).await,
        Command::Info => {
            let info = connect(&config)?.client().app_info().await?;
            println!("{} v{}", info.project_name, info.version);
            println!("{}", info.description);
            println!("API prefix:       {}", info.api);
            println!("Configured model: {}", info.configured_openai_model);
            println!("Default model:    {}", info.default_openai_model);
            Ok(())
        }
        Command::Health => {
            let health = connect(&config)?.client().health().await?;
            println!("{}: {}", health.status, health.message);
            Ok(())
        }
        Command::Token { refresh } => {
            let advisor = connect(&config)?;
            let token = if refresh {
                advisor.session().refresh_token().await?
            } else {
                advisor.session().ensure_token().await?
            };
            println!("✅ Session token ready ({})", mask(&token));
            Ok(())
        }
    }
}

fn connect(config: &CliConfig) -> Result<TaxAdvisor, TaxError> {
    let settings = ClientSettings::resolve(config)?;
    settings.validate()?;
    tracing::info!("Using API at {}", settings.base_url);

    let advisor = TaxAdvisor::from_config(&settings)?;

    // 顯示層：session 事件以橫幅輸出到 stderr
    advisor.session().subscribe(|event| match event {
        SessionEvent::TokenRejected { message, .. } => eprintln!("⚠️  {}", message),
        SessionEvent::TokenFetchFailed { message } => eprintln!("⚠️  {}", message),
        SessionEvent::TokenIssued => {}
    });
    Ok(advisor)
}

async fn advise(advisor: &TaxAdvisor, args: AdviseArgs) -> Result<(), TaxError> {
    advisor.start().await;

    let mut form = advisor.form();
    form.set_field(Field::Income, args.income);
    form.set_field(Field::Expenses, args.expenses);
    form.set_field(Field::Deductions, args.deductions);
    if let Some(country) = args.country {
        form.set_field(Field::Country, country.trim().to_uppercase());
    }

    match form.submit().await {
        FormPhase::Success => {
            if let Some(report) = form.report() {
                println!("{}", report.render_text());
                if let Some(path) = &args.report_out {
                    report.export(path)?;
                    println!("📁 Report saved to: {}", path.display());
                }
            }
            Ok(())
        }
        _ => {
            if let Some(message) = form.errors().general() {
                return Err(TaxError::AdviceError {
                    message: message.to_string(),
                });
            }
            for (field, message) in form.errors().iter_fields() {
                eprintln!("  {:<11} {}", format!("{}:", field), message);
            }
            Err(TaxError::ValidationError {
                message: "Please fill in all fields correctly.".to_string(),
            })
        }
    }
}

fn mask(token: &str) -> String {
    let visible: String = token.chars().take(6).collect();
    format!("{}…", visible)
}

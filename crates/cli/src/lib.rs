pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "vantage",
    about = "Vantage customer analytics CLI",
    long_about = "Score and segment customers from order history: lifecycle segments, RFM, \
                  churn risk, lifetime value predictions and potential-customer discovery.",
    after_help = "Examples:\n  vantage migrate\n  vantage seed\n  vantage segment 1\n  \
                  vantage predict 1 2 3 --recommendations\n  vantage potential --category-id 1 --limit 10"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Apply pending database migrations")]
    Migrate,
    #[command(about = "Load the demo shop dataset into a migrated database")]
    Seed,
    #[command(about = "Inspect the effective configuration")]
    Config,
    #[command(about = "Analyze one customer: metrics, trends and lifecycle segment")]
    Segment {
        customer_id: i64,
        #[arg(long, help = "Business type profile to score against")]
        business_type: Option<String>,
    },
    #[command(about = "Recency/frequency/monetary scoring across the customer base")]
    Rfm {
        #[arg(long, help = "Restrict the analysis to one customer")]
        customer_id: Option<i64>,
        #[arg(long)]
        business_type: Option<String>,
    },
    #[command(about = "Churn risk assessment with retention plans")]
    Churn {
        #[arg(long, help = "Only consider orders placed more than this many days ago")]
        inactive_days: Option<i64>,
        #[arg(long)]
        business_type: Option<String>,
    },
    #[command(about = "Customer lifetime value predictions for a batch of customers")]
    Predict {
        #[arg(required = true)]
        customer_ids: Vec<i64>,
        #[arg(long, default_value_t = 12)]
        months: u32,
        #[arg(long, help = "Attach product, promotion and strategy recommendations")]
        recommendations: bool,
        #[arg(long)]
        business_type: Option<String>,
    },
    #[command(about = "Rank customers by interest in a set of products or categories")]
    Potential {
        #[arg(long = "product-id")]
        product_ids: Vec<i64>,
        #[arg(long = "category-id")]
        category_ids: Vec<i64>,
        #[arg(long, default_value_t = 20)]
        limit: usize,
        #[arg(long)]
        business_type: Option<String>,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Migrate => commands::migrate::run(),
        Command::Seed => commands::seed::run(),
        Command::Config => commands::config::run(),
        Command::Segment { customer_id, business_type } => {
            commands::segment::run(customer_id, business_type)
        }
        Command::Rfm { customer_id, business_type } => {
            commands::rfm::run(customer_id, business_type)
        }
        Command::Churn { inactive_days, business_type } => {
            commands::churn::run(inactive_days, business_type)
        }
        Command::Predict { customer_ids, months, recommendations, business_type } => {
            commands::predict::run(customer_ids, months, recommendations, business_type)
        }
        Command::Potential { product_ids, category_ids, limit, business_type } => {
            commands::potential::run(product_ids, category_ids, limit, business_type)
        }
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

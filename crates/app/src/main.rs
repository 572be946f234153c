//! MakanBar demo CLI
//!
//! Exercises the stores end to end against whichever backend the
//! environment selects: Firebase when configured, otherwise the seeded
//! in-memory fallback.

use std::process;

use clap::{Args, Parser, Subcommand, ValueEnum};
use makanbar::{
    cart::Cart,
    catalog::ItemId,
    order::{self, Bank, PaymentMethod},
    promo::FlatPercentagePolicy,
};
use makanbar_app::context::AppContext;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "makanbar-app", about = "MakanBar CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List the menu.
    Menu(MenuArgs),
    /// List active promotions.
    Promos,
    /// Place a demo order and walk it through delivery.
    Order(OrderArgs),
    /// Sign in and print the resolved identity.
    Login(LoginArgs),
}

#[derive(Debug, Args)]
struct MenuArgs {
    /// Only show items flagged as popular
    #[arg(long)]
    popular: bool,
}

#[derive(Debug, Args)]
struct OrderArgs {
    /// Menu item to order as ID or ID:QUANTITY; repeatable
    #[arg(long = "item", required = true)]
    items: Vec<String>,

    /// Promo code to apply at checkout
    #[arg(long)]
    promo: Option<String>,

    /// Payment method
    #[arg(long, value_enum, default_value_t = Payment::Qris)]
    payment: Payment,
}

#[derive(Debug, Args)]
struct LoginArgs {
    /// Account email
    #[arg(long, env = "MAKANBAR_EMAIL")]
    email: String,

    /// Account password
    #[arg(long, env = "MAKANBAR_PASSWORD")]
    password: String,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Payment {
    Bca,
    Bni,
    Bri,
    Mandiri,
    Gopay,
    Dana,
    Qris,
}

impl From<Payment> for PaymentMethod {
    fn from(payment: Payment) -> Self {
        match payment {
            Payment::Bca => Self::BankTransfer(Bank::Bca),
            Payment::Bni => Self::BankTransfer(Bank::Bni),
            Payment::Bri => Self::BankTransfer(Bank::Bri),
            Payment::Mandiri => Self::BankTransfer(Bank::Mandiri),
            Payment::Gopay => Self::GoPay,
            Payment::Dana => Self::Dana,
            Payment::Qris => Self::Qris,
        }
    }
}

#[tokio::main]
pub async fn main() {
    let _env = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if let Err(error) = run(cli).await {
        eprintln!("{error}");
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), String> {
    let context =
        AppContext::from_env().map_err(|error| format!("failed to start backend: {error}"))?;

    match cli.command {
        Commands::Menu(args) => menu(&context, args),
        Commands::Promos => promos(&context),
        Commands::Order(args) => place_order(&context, args),
        Commands::Login(args) => login(&context, args).await,
    }
}

fn menu(context: &AppContext, args: MenuArgs) -> Result<(), String> {
    let items = if args.popular {
        context.catalog.popular_items()
    } else {
        context.catalog.menu_items()
    };

    for item in items {
        println!("{}  {}  {}", item.id, item.name, item.price);
    }

    Ok(())
}

fn promos(context: &AppContext) -> Result<(), String> {
    for promo in context.catalog.promotions() {
        println!("{}  {}", promo.title, promo.subtitle);
    }

    Ok(())
}

fn place_order(context: &AppContext, args: OrderArgs) -> Result<(), String> {
    let mut cart = Cart::default();

    for spec in &args.items {
        let (id, quantity) = parse_item_spec(spec)?;
        let item = context
            .catalog
            .menu_item(&id)
            .ok_or_else(|| format!("no menu item with id {id}"))?;

        cart.add_item(&item);
        if quantity > 1 {
            cart.set_quantity(&id, quantity);
        }
    }

    if let Some(code) = args.promo {
        cart.set_promo_code(code);
    }

    let policy = FlatPercentagePolicy::default();
    let mut order = order::place_order(&mut cart, args.payment.into(), &policy)
        .map_err(|error| error.to_string())?;

    println!("order {}", order.id);
    for line in &order.lines {
        println!("  {} x{}  {}", line.item.name, line.quantity, line.line_total());
    }
    println!("  items     {}", order.receipt.item_total);
    println!("  delivery  {}", order.receipt.delivery_fee);
    println!("  discount  {}", order.receipt.promo_discount);
    println!("  total     {}", order.receipt.total_amount);

    while !order.status.is_final() {
        order.advance();
        println!("status: {}", order.status);
    }

    Ok(())
}

async fn login(context: &AppContext, args: LoginArgs) -> Result<(), String> {
    context.session.resolve();

    let identity = context
        .session
        .login(&args.email, &args.password)
        .await
        .map_err(|error| error.user_message().to_owned())?;

    println!("signed in as {} ({:?})", identity.display_name, identity.role);

    Ok(())
}

fn parse_item_spec(spec: &str) -> Result<(ItemId, u32), String> {
    match spec.split_once(':') {
        Some((id, quantity)) => {
            let quantity: u32 = quantity
                .parse()
                .map_err(|_| format!("invalid quantity in --item {spec}"))?;

            if quantity == 0 {
                return Err(format!("quantity must be at least 1 in --item {spec}"));
            }

            Ok((ItemId::from(id), quantity))
        }
        None => Ok((ItemId::from(spec), 1)),
    }
}

use anyhow::{Context, Result, bail};
use clap::Subcommand;
use orchard_client::ApiClient;
use orchard_model::prelude::*;
use serde::Serialize;

#[derive(Subcommand)]
pub enum Command {
    /// Sign in and store the session
    Login {
        /// Username or phone number
        identifier: String,
        #[arg(long, env = "ORCHARD_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create an account and sign in
    Register {
        username: String,
        phone: String,
        #[arg(long, env = "ORCHARD_PASSWORD", hide_env_values = true)]
        password: String,
        /// Referral code of the inviting user
        #[arg(long)]
        referral: Option<String>,
    },
    /// Revoke the session and forget stored tokens
    Logout,
    /// Show the signed-in user
    Whoami {
        /// Print the cached snapshot without contacting the server
        #[arg(long)]
        cached: bool,
    },
    /// Show application settings
    Settings,
    /// Browse and buy investment products
    Products {
        #[command(subcommand)]
        action: ProductsAction,
    },
    /// List your investments
    Investments,
    /// Bank account, withdrawals and ledger
    Wallet {
        #[command(subcommand)]
        action: WalletAction,
    },
    /// Show your referral team
    Team,
    /// Daily prize wheel
    Spin {
        #[command(subcommand)]
        action: SpinAction,
    },
    /// Community testimonials
    Forum {
        #[command(subcommand)]
        action: ForumAction,
    },
    /// Administrator tools
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand)]
pub enum ProductsAction {
    /// List the catalogue
    List {
        /// Hide sold-out and inactive products
        #[arg(long)]
        available: bool,
    },
    /// Show one product
    Show { id: String },
    /// Purchase a product
    Buy {
        id: String,
        #[arg(long, default_value_t = 1)]
        quantity: u32,
    },
}

#[derive(Subcommand)]
pub enum WalletAction {
    /// Show the registered bank account
    Bank,
    /// Register or replace the bank account
    SetBank {
        #[arg(long)]
        bank_name: String,
        #[arg(long)]
        account_name: String,
        #[arg(long)]
        account_number: String,
        #[arg(long)]
        branch_code: Option<String>,
    },
    /// Request a withdrawal
    Withdraw { amount: f64 },
    /// Withdrawal history
    Withdrawals,
    /// Wallet ledger
    Transactions,
}

#[derive(Subcommand)]
pub enum SpinAction {
    /// Remaining spins
    Status,
    /// Spin the wheel
    Go,
}

#[derive(Subcommand)]
pub enum ForumAction {
    /// List approved posts
    List {
        #[arg(long)]
        page: Option<u32>,
    },
    /// Submit a testimonial
    Post {
        body: String,
        #[arg(long)]
        image_url: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum AdminAction {
    /// List users
    Users,
    /// Pending withdrawals
    Withdrawals,
    /// Approve a withdrawal
    Approve { id: String },
    /// Reject a withdrawal
    Reject {
        id: String,
        #[arg(long)]
        reason: Option<String>,
    },
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

impl Command {
    pub async fn execute(self, client: &ApiClient) -> Result<()> {
        match self {
            Command::Login {
                identifier,
                password,
            } => {
                let payload = client
                    .login(&LoginRequest {
                        identifier,
                        password,
                    })
                    .await?;
                print_json(&payload.user)
            }
            Command::Register {
                username,
                phone,
                password,
                referral,
            } => {
                let payload = client
                    .register(&RegisterRequest {
                        username,
                        phone,
                        password,
                        referral_code: referral,
                    })
                    .await?;
                print_json(&payload.user)
            }
            Command::Logout => {
                client.logout_user().await?;
                println!("Logged out");
                Ok(())
            }
            Command::Whoami { cached: true } => {
                let user = client
                    .cached_user()
                    .context("no cached user; run `orchardctl login`")?;
                print_json(&user)
            }
            Command::Whoami { cached: false } => print_json(&client.me().await?),
            Command::Settings => print_json(&client.settings().await?),
            Command::Products { action } => action.execute(client).await,
            Command::Investments => print_json(&client.investments().await?),
            Command::Wallet { action } => action.execute(client).await,
            Command::Team => print_json(&client.team().await?),
            Command::Spin { action } => action.execute(client).await,
            Command::Forum { action } => action.execute(client).await,
            Command::Admin { action } => action.execute(client).await,
        }
    }
}

impl ProductsAction {
    async fn execute(self, client: &ApiClient) -> Result<()> {
        match self {
            ProductsAction::List { available } => {
                let mut products = client.products().await?;
                if available {
                    products.retain(Product::is_available);
                }
                print_json(&products)
            }
            ProductsAction::Show { id } => print_json(&client.product(&id).await?),
            ProductsAction::Buy { id, quantity } => {
                if quantity == 0 {
                    bail!("quantity must be at least 1");
                }
                print_json(&client.purchase(&id, quantity).await?)
            }
        }
    }
}

impl WalletAction {
    async fn execute(self, client: &ApiClient) -> Result<()> {
        match self {
            WalletAction::Bank => print_json(&client.bank_account().await?),
            WalletAction::SetBank {
                bank_name,
                account_name,
                account_number,
                branch_code,
            } => {
                let account = BankAccount {
                    bank_name,
                    account_name,
                    account_number,
                    branch_code,
                };
                print_json(&client.save_bank_account(&account).await?)
            }
            WalletAction::Withdraw { amount } => {
                if !amount.is_finite() || amount <= 0.0 {
                    bail!("amount must be a positive number");
                }
                if let Some(minimum) = client
                    .cached_settings()
                    .map(|s| s.min_withdrawal())
                    .filter(|min| *min > 0.0 && amount < *min)
                {
                    log::warn!("Amount {amount} is below the advertised minimum {minimum}");
                }
                print_json(&client.request_withdrawal(amount).await?)
            }
            WalletAction::Withdrawals => print_json(&client.withdrawals().await?),
            WalletAction::Transactions => print_json(&client.transactions().await?),
        }
    }
}

impl SpinAction {
    async fn execute(self, client: &ApiClient) -> Result<()> {
        match self {
            SpinAction::Status => print_json(&client.spin_status().await?),
            SpinAction::Go => print_json(&client.spin().await?),
        }
    }
}

impl ForumAction {
    async fn execute(self, client: &ApiClient) -> Result<()> {
        match self {
            ForumAction::List { page } => print_json(&client.forum_posts(page).await?),
            ForumAction::Post { body, image_url } => {
                let post = NewForumPost { body, image_url };
                print_json(&client.create_forum_post(&post).await?)
            }
        }
    }
}

impl AdminAction {
    async fn execute(self, client: &ApiClient) -> Result<()> {
        match self {
            AdminAction::Users => print_json(&client.admin_users().await?),
            AdminAction::Withdrawals => print_json(&client.admin_withdrawals().await?),
            AdminAction::Approve { id } => print_json(&client.approve_withdrawal(&id).await?),
            AdminAction::Reject { id, reason } => {
                print_json(&client.reject_withdrawal(&id, reason).await?)
            }
        }
    }
}

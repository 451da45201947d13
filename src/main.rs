use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use color_eyre::Result;

use agrilink::api::{ApiClient, HttpTransport};
use agrilink::app::App;
use agrilink::config::Config;
use agrilink::logging;
use agrilink::notify::Notifier;
use agrilink::router::{Route, Router};
use agrilink::services::{ServiceContext, Services};
use agrilink::session::AuthContext;
use agrilink::ui::Context;

#[derive(Parser, Debug)]
#[command(name = "agrilink")]
#[command(about = "A terminal client for the agricultural consultancy platform")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/agrilink/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Account email, prefills the login form
  #[arg(short, long)]
  email: Option<String>,

  /// Server root, overrides api.url from the config file
  #[arg(long)]
  api_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();

  // Load configuration, then apply command line overrides
  let mut config = Config::load(args.config.as_deref())?;
  if let Some(url) = args.api_url {
    config.api.url = url;
  }
  if let Some(email) = args.email {
    config.account.email = Some(email);
  }

  let _log_guard = logging::init(&config)?;
  tracing::info!(api = %config.api.url, "starting");

  // Session from the environment, if any
  let auth = match AuthContext::session_from_env(config.account.email.as_deref())? {
    Some(session) => AuthContext::with_session(session),
    None => AuthContext::new(),
  };
  let router = Router::new(auth.role().map(Route::home_for).unwrap_or(Route::Login));

  let transport = HttpTransport::new(config.timeout())?;
  let client = ApiClient::new(
    &config.api.url,
    Arc::new(transport),
    auth.clone(),
    router.clone(),
  )?;
  let services = Services::new(
    ServiceContext {
      client,
      auth: auth.clone(),
      notifier: Notifier::new(),
      policy: config.fetch_policy(),
    },
    router.clone(),
  );

  // Non-interactive sign-in when a password is supplied
  if !auth.is_authenticated() {
    if let (Some(email), Some(password)) = (config.account.email.as_deref(), Config::get_password())
    {
      services.auth.login(email, &password).await;
    }
  }

  let mut app = App::new(Context::new(services, router), &config);
  app.run().await?;

  tracing::info!("exiting");
  Ok(())
}

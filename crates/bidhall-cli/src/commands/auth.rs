//! Login, registration, logout and session status.

use anyhow::Result;
use bidhall_core::Config;
use bidhall_core::validation::{LoginForm, RegisterForm};

use super::{gateway, with_spinner};
use crate::ui::{self, prompts};

/// Login command arguments.
#[derive(Debug, Clone, Default)]
pub struct LoginArgs {
    /// Student email.
    pub email: Option<String>,
    /// Password, prompted for when absent.
    pub password: Option<String>,
}

/// Register command arguments.
#[derive(Debug, Clone, Default)]
pub struct RegisterArgs {
    /// Profile name.
    pub name: Option<String>,
    /// Student email.
    pub email: Option<String>,
    /// Password, prompted for (twice) when absent.
    pub password: Option<String>,
    /// Avatar URL.
    pub avatar: Option<String>,
    /// Banner URL.
    pub banner: Option<String>,
}

/// Run the login command.
pub async fn run_login(config: &Config, args: LoginArgs) -> Result<()> {
    let gateway = gateway(config)?;

    let email = prompts::or_input(args.email, "Email")?;
    let password = match args.password {
        Some(p) => p,
        None => prompts::password("Password")?,
    };
    let form = LoginForm { email, password };

    let user = with_spinner("Logging in...", gateway.login(&form)).await?;

    ui::success(&format!("Logged in as {}", user.name));
    ui::kv("Credits", &user.credits_badge());
    Ok(())
}

/// Run the register command.
pub async fn run_register(config: &Config, args: RegisterArgs) -> Result<()> {
    let gateway = gateway(config)?;

    let name = prompts::or_input(args.name, "Name")?;
    let email = prompts::or_input(args.email, "Email (@stud.noroff.no)")?;
    let (password, confirm_password) = match args.password {
        Some(p) => (p.clone(), p),
        None => (
            prompts::password("Password")?,
            prompts::password("Confirm password")?,
        ),
    };

    let form = RegisterForm {
        name,
        email,
        password,
        confirm_password,
        avatar: args.avatar,
        banner: args.banner,
    };

    let profile = with_spinner("Registering...", gateway.register(&form)).await?;

    ui::success(&format!("Registered {}", profile.name));
    ui::info("You can now log in with 'bidhall login'.");
    Ok(())
}

/// Run the logout command.
pub async fn run_logout(config: &Config) -> Result<()> {
    gateway(config)?.logout().await;
    ui::success("Logged out");
    Ok(())
}

/// Run the whoami command.
pub async fn run_whoami(config: &Config) -> Result<()> {
    let session = gateway(config)?.session().await?;

    let Some(user) = session.user().filter(|_| session.is_logged_in()) else {
        ui::info("Not logged in. Run 'bidhall login' to get started.");
        return Ok(());
    };

    ui::header("Logged in");
    ui::kv("Name", &user.name);
    if !user.email.is_empty() {
        ui::kv("Email", &user.email);
    }
    ui::kv("Credits", &user.credits_badge());
    if let Some(avatar) = &user.avatar {
        ui::kv("Avatar", avatar);
    }
    ui::kv(
        "API key",
        if session.api_key().is_some() {
            "cached"
        } else {
            "created on next request"
        },
    );
    Ok(())
}

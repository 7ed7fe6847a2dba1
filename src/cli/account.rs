use std::error::Error;

use crate::cli::Reported;
use crate::core::context::AppContext;
use crate::ui::prompt::Prompter;

fn username_or_prompt(
    prompts: &mut Prompter<impl std::io::BufRead, impl std::io::Write>,
    username: Option<String>,
) -> Result<String, Box<dyn Error>> {
    match username {
        Some(username) => Ok(username),
        None => Ok(prompts.required("Username: ", "Username")?),
    }
}

pub async fn register(
    context: &mut AppContext,
    username: Option<String>,
    image: &str,
) -> Result<(), Box<dyn Error>> {
    let mut prompts = Prompter::stdio();
    let username = username_or_prompt(&mut prompts, username)?;
    let password = prompts.password("Password: ")?;

    context
        .register(&username, &password, image)
        .await
        .map_err(|_| Reported)?;
    println!("💡 Log in with:");
    println!("   kappachat login {}", username.trim());
    Ok(())
}

pub async fn login(
    context: &mut AppContext,
    username: Option<String>,
) -> Result<(), Box<dyn Error>> {
    let mut prompts = Prompter::stdio();
    let username = username_or_prompt(&mut prompts, username)?;
    let password = prompts.password("Password: ")?;

    context
        .login(&username, &password)
        .await
        .map_err(|_| Reported)?;
    Ok(())
}

pub async fn logout(context: &mut AppContext) -> Result<(), Box<dyn Error>> {
    match context.session().cloned() {
        Some(session) => {
            context.logout().await?;
            println!("✅ Logged out {}", session.username);
        }
        None => println!("Not logged in."),
    }
    Ok(())
}

pub fn whoami(context: &AppContext) {
    match context.session() {
        Some(session) => println!(
            "Logged in as {} (user id {})",
            session.username, session.user_id
        ),
        None => println!("Not logged in."),
    }
}

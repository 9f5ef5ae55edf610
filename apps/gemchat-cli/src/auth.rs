use console::style;
use gemchat_auth::{
    fallback_countries, load_countries, AuthConfig, AuthError, AuthManager, AuthStep, Country,
    OtpForm, PhoneForm, RestCountriesClient,
};

use crate::input::Input;

/// Run the sign-in prompts. Returns `false` if input ended before success.
pub async fn run(input: &mut Input, config: &AuthConfig, offline: bool) -> anyhow::Result<bool> {
    let countries = if offline {
        fallback_countries()
    } else {
        println!("{}", style("Loading countries...").dim());
        load_countries(&RestCountriesClient::new(config.countries_url.as_str())).await
    };

    let mut manager = AuthManager::simulated(config);
    println!("{}", style("Sign in with your phone number").bold());

    loop {
        match manager.step().clone() {
            AuthStep::Phone => {
                let Some(country) = input
                    .prompt("Country (dial code or name, ? to list): ")
                    .await?
                else {
                    return Ok(false);
                };
                if country == "?" {
                    list_countries(&countries);
                    continue;
                }
                let country_code = match resolve_country(&countries, &country) {
                    Some(c) => c.dial.clone(),
                    None if country.is_empty() => String::new(),
                    None => {
                        println!("{}", style(format!("Unknown country: {}", country)).red());
                        continue;
                    }
                };

                let Some(phone) = input.prompt("Phone number: ").await? else {
                    return Ok(false);
                };

                println!("{}", style("Sending OTP...").dim());
                match manager.submit_phone(PhoneForm::new(country_code, phone)).await {
                    Ok(()) => {}
                    Err(AuthError::Validation(report)) => {
                        for error in &report.errors {
                            println!("{}", style(&error.message).red());
                        }
                    }
                    Err(e) => return Err(e.into()),
                }
            }
            AuthStep::Otp { country_code, phone } => {
                let label = format!("OTP sent to {} {} (/change to edit): ", country_code, phone);
                let Some(otp) = input.prompt(&label).await? else {
                    return Ok(false);
                };
                if otp == "/change" {
                    manager.change_phone()?;
                    continue;
                }

                match manager.submit_otp(OtpForm::new(otp)).await {
                    Ok(()) => {}
                    Err(AuthError::Validation(report)) => {
                        for error in &report.errors {
                            println!("{}", style(&error.message).red());
                        }
                    }
                    Err(e @ AuthError::InvalidOtp { .. }) => {
                        println!("{}", style(e).red());
                    }
                    Err(e) => return Err(e.into()),
                }
            }
            AuthStep::Success { country_code, phone } => {
                println!(
                    "{}",
                    style(format!("✓ Signed in as {} {}", country_code, phone)).green()
                );
                tokio::time::sleep(config.redirect_delay).await;
                return Ok(true);
            }
        }
    }
}

/// Match a dial code (`+44`), ISO code (`gb`) or name (`united kingdom`)
fn resolve_country<'a>(countries: &'a [Country], query: &str) -> Option<&'a Country> {
    if query.is_empty() {
        return None;
    }
    if query.starts_with('+') {
        return countries.iter().find(|c| c.dial == query);
    }

    countries.iter().find(|c| {
        c.code.eq_ignore_ascii_case(query) || c.name.to_lowercase() == query.to_lowercase()
    })
}

fn list_countries(countries: &[Country]) {
    for country in countries {
        println!(
            "  {:<6} {} {}",
            country.dial,
            country.name,
            style(&country.code).dim()
        );
    }
}

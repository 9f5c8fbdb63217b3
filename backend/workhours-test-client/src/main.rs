// src/main.rs

use reqwest::{header, Client, StatusCode};
use serde::Deserialize;
use std::env;
use std::error::Error;

// Response types
#[derive(Debug, Deserialize)]
struct HealthResponse {
    status: String,
}

#[derive(Debug, Deserialize)]
struct DashboardSummary {
    hours_today: f64,
    hours_this_week: f64,
    events_this_week: u32,
    leave_this_week: u32,
    has_pending_hours: bool,
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    status: bool,
    message: String,
    data: Option<T>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let base_url = env::var("WORKHOURS_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());
    let client = Client::new();

    // Test 1: Health check
    println!("\n🔍 Testing health check endpoint...");
    let health_response = client
        .get(format!("{}/health", base_url))
        .send()
        .await?
        .json::<HealthResponse>()
        .await?;
    println!("Health check response: {:?}", health_response);

    // Test 2: Summary without a token must be rejected
    println!("\n🔍 Testing dashboard summary without token...");
    let anonymous = client
        .get(format!("{}/api/dashboard/summary", base_url))
        .send()
        .await?;
    let anonymous_status = anonymous.status();
    let anonymous_body = anonymous.json::<Envelope<DashboardSummary>>().await?;
    println!(
        "Anonymous status: {} (expected {}), body: {:?}",
        anonymous_status,
        StatusCode::UNAUTHORIZED,
        anonymous_body
    );

    // Mint one with: workhours issue-token --user <id>
    let token = match env::var("WORKHOURS_TOKEN") {
        Ok(token) => token,
        Err(_) => prompt_for_token()?,
    };

    if !token.is_empty() {
        // Test 3: Summary with token
        println!("\n🔍 Testing dashboard summary with token...");
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            header::HeaderValue::from_str(&format!("Bearer {}", token))?,
        );

        let response = client
            .get(format!("{}/api/dashboard/summary", base_url))
            .headers(headers)
            .send()
            .await?;
        println!("Summary response status: {}", response.status());

        let envelope = response.json::<Envelope<DashboardSummary>>().await?;
        println!("Message: {}", envelope.message);
        match envelope.data {
            Some(summary) if envelope.status => {
                println!("  Hours today:      {:.1}", summary.hours_today);
                println!("  Hours this week:  {:.1}", summary.hours_this_week);
                println!("  Events this week: {}", summary.events_this_week);
                println!("  Leave this week:  {}", summary.leave_this_week);
                if summary.has_pending_hours {
                    println!("  ⚠️ Some hours are still pending approval");
                }
            }
            _ => println!("Failed to get summary"),
        }
    }

    println!("\n✅ Testing complete!");

    Ok(())
}

fn prompt_for_token() -> Result<String, Box<dyn Error>> {
    println!("Enter bearer token (press Enter to skip token-based tests):");
    let mut token = String::new();
    std::io::stdin().read_line(&mut token)?;
    Ok(token.trim().to_string())
}

//! Best-effort, rate-limited operational notifications to one Telegram chat.
//!
//! Every send returns `bool`; transport failures are logged and never reach
//! the caller. One shared timestamp throttles all message kinds, and alerts
//! bypass it.

use crate::config::TelegramConfig;
use crate::error::Result;
use async_trait::async_trait;
use chrono::Local;
use log::{debug, error, info, warn};
use std::fmt;
use std::time::{Duration, Instant};
use teloxide::prelude::*;
use teloxide::types::{ParseMode, Recipient};
use tokio::sync::Mutex;

/// The two Bot API calls the notifier needs.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageTransport: Send + Sync {
    async fn send_message(&self, text: &str) -> Result<()>;

    /// Returns the bot's first name.
    async fn get_me(&self) -> Result<String>;
}

pub struct TeloxideTransport {
    bot: Bot,
    recipient: Recipient,
    parse_mode: ParseMode,
}

impl TeloxideTransport {
    pub fn new(bot_token: &str, chat_id: &str, parse_mode: &str) -> Self {
        Self {
            bot: Bot::new(bot_token),
            recipient: recipient_from(chat_id),
            parse_mode: parse_mode_from(parse_mode),
        }
    }
}

#[async_trait]
impl MessageTransport for TeloxideTransport {
    async fn send_message(&self, text: &str) -> Result<()> {
        self.bot
            .send_message(self.recipient.clone(), text)
            .parse_mode(self.parse_mode.clone())
            .await?;
        Ok(())
    }

    async fn get_me(&self) -> Result<String> {
        let me = self.bot.get_me().await?;
        Ok(me.user.first_name.clone())
    }
}

/// Numeric ids address chats directly; anything else is a channel username.
fn recipient_from(chat_id: &str) -> Recipient {
    match chat_id.trim().parse::<i64>() {
        Ok(id) => Recipient::Id(ChatId(id)),
        Err(_) => Recipient::ChannelUsername(chat_id.trim().to_string()),
    }
}

fn parse_mode_from(parse_mode: &str) -> ParseMode {
    match parse_mode.to_ascii_lowercase().as_str() {
        "markdownv2" => ParseMode::MarkdownV2,
        _ => ParseMode::Html,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlertLevel {
    Info,
    Warning,
    Error,
    Success,
    Other(String),
}

impl AlertLevel {
    pub fn marker(&self) -> &'static str {
        match self {
            AlertLevel::Info => "ℹ️",
            AlertLevel::Warning => "⚠️",
            AlertLevel::Error => "❌",
            AlertLevel::Success => "✅",
            AlertLevel::Other(_) => "📢",
        }
    }

    fn is_timestamped(&self) -> bool {
        matches!(self, AlertLevel::Warning | AlertLevel::Error)
    }
}

impl From<&str> for AlertLevel {
    fn from(level: &str) -> Self {
        match level.to_ascii_uppercase().as_str() {
            "INFO" => AlertLevel::Info,
            "WARNING" => AlertLevel::Warning,
            "ERROR" => AlertLevel::Error,
            "SUCCESS" => AlertLevel::Success,
            _ => AlertLevel::Other(level.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StatusValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for StatusValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusValue::Bool(true) => write!(f, "Yes"),
            StatusValue::Bool(false) => write!(f, "No"),
            StatusValue::Int(v) => write!(f, "{}", group_thousands(&v.to_string())),
            StatusValue::Float(v) => write!(f, "{}", group_thousands(&v.to_string())),
            StatusValue::Text(v) => write!(f, "{}", v),
        }
    }
}

impl From<bool> for StatusValue {
    fn from(v: bool) -> Self {
        StatusValue::Bool(v)
    }
}

impl From<usize> for StatusValue {
    fn from(v: usize) -> Self {
        StatusValue::Int(v as i64)
    }
}

impl From<i64> for StatusValue {
    fn from(v: i64) -> Self {
        StatusValue::Int(v)
    }
}

impl From<f64> for StatusValue {
    fn from(v: f64) -> Self {
        StatusValue::Float(v)
    }
}

impl From<&str> for StatusValue {
    fn from(v: &str) -> Self {
        StatusValue::Text(v.to_string())
    }
}

/// "1234567.5" -> "1,234,567.5"
fn group_thousands(number: &str) -> String {
    let (sign, rest) = match number.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", number),
    };
    let (int_part, frac_part) = match rest.find('.') {
        Some(idx) => rest.split_at(idx),
        None => (rest, ""),
    };
    if !int_part.chars().all(|c| c.is_ascii_digit()) {
        return number.to_string();
    }

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    format!("{}{}{}", sign, grouped, frac_part)
}

/// "api_error_rate" -> "Api Error Rate"
fn display_key(key: &str) -> String {
    key.replace('_', " ")
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(|c| c.to_lowercase())).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

pub fn format_alert(title: &str, message: &str, level: &AlertLevel) -> String {
    let mut formatted = format!("{} <b>{}</b>\n\n{}", level.marker(), title, message);
    if level.is_timestamped() {
        formatted.push_str(&format!("\n\nTime: {}", Local::now().format("%Y-%m-%d %H:%M:%S")));
    }
    formatted
}

pub fn format_status(status: &[(String, StatusValue)]) -> String {
    let mut message = String::from("<b>System Status Update</b>\n\n");
    for (key, value) in status {
        message.push_str(&format!("• <b>{}:</b> {}\n", display_key(key), value));
    }
    message
}

pub struct TelegramNotifier {
    transport: Box<dyn MessageTransport>,
    configured: bool,
    min_interval: Duration,
    last_sent: Mutex<Option<Instant>>,
}

impl TelegramNotifier {
    pub fn new(config: &TelegramConfig) -> Self {
        let transport = TeloxideTransport::new(&config.bot_token, &config.chat_id, &config.parse_mode);
        let configured = !config.bot_token.trim().is_empty() && !config.chat_id.trim().is_empty();
        Self::with_transport(Box::new(transport), configured, config.min_interval())
    }

    pub fn with_transport(
        transport: Box<dyn MessageTransport>,
        configured: bool,
        min_interval: Duration,
    ) -> Self {
        Self {
            transport,
            configured,
            min_interval,
            last_sent: Mutex::new(None),
        }
    }

    /// Sends `message` unless the last successful send was less than
    /// `min_interval` ago. `force` skips that check.
    pub async fn send_message(&self, message: &str, force: bool) -> bool {
        if !self.configured {
            warn!("Telegram bot not configured");
            return false;
        }

        let mut last_sent = self.last_sent.lock().await;
        let now = Instant::now();
        if !force {
            if let Some(previous) = *last_sent {
                if now.duration_since(previous) < self.min_interval {
                    debug!("Rate limiting: message not sent");
                    return false;
                }
            }
        }

        match self.transport.send_message(message).await {
            Ok(()) => {
                *last_sent = Some(now);
                debug!("Telegram message sent successfully");
                true
            }
            Err(e) => {
                error!("Error sending Telegram message: {}", e);
                false
            }
        }
    }

    pub async fn send_alert(&self, title: &str, message: &str, level: AlertLevel) -> bool {
        self.send_message(&format_alert(title, message, &level), true).await
    }

    pub async fn send_status_update(&self, status: &[(String, StatusValue)]) -> bool {
        self.send_message(&format_status(status), false).await
    }

    pub fn is_configured(&self) -> bool {
        self.configured
    }

    pub async fn test_connection(&self) -> bool {
        if !self.configured {
            error!("Bot token not configured");
            return false;
        }
        match self.transport.get_me().await {
            Ok(name) => {
                info!("Bot connection successful: {}", name);
                true
            }
            Err(e) => {
                error!("Error testing bot connection: {}", e);
                false
            }
        }
    }
}

// Copyright 2024 FastLabs Developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! A sink that mails every record to a fixed set of recipients.

use std::fmt;

use crate::Error;
use crate::Level;
use crate::LevelLimit;
use crate::Record;
use crate::layout::TextLayout;
use crate::sink::Sink;

#[cfg(feature = "sink-mail")]
mod transport;

#[cfg(feature = "sink-mail")]
pub use self::transport::LettreMailer;

const DEFAULT_SUBJECT: &str = "Log Entry:";
const DEFAULT_CUSTOM_SUBJECT: &str = "Custom Log Entry";

/// A mail recipient, optionally named.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipient {
    /// The display name.
    pub name: Option<String>,
    /// The address, e.g. `ops@example.com`.
    pub email: String,
}

impl Recipient {
    /// A recipient without a display name.
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            name: None,
            email: email.into(),
        }
    }

    /// A recipient with a display name.
    pub fn named(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            email: email.into(),
        }
    }
}

impl From<&str> for Recipient {
    fn from(email: &str) -> Self {
        Recipient::new(email)
    }
}

impl From<String> for Recipient {
    fn from(email: String) -> Self {
        Recipient::new(email)
    }
}

impl fmt::Display for Recipient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{name} <{}>", self.email),
            None => f.write_str(&self.email),
        }
    }
}

/// Options of a [`MailSink`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MailOptions {
    subject: Option<String>,
    headers: Vec<(String, String)>,
}

impl MailOptions {
    /// Create options with the default subject and no headers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the subject prefix. Defaults to `Log Entry:`.
    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Add a header.
    ///
    /// `Cc`, `Bcc`, `From`, `Reply-To`, `Sender` and `Return-Path` (in any case) are
    /// recognized; anything else is passed on as a generic header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// The headers of a [`Mail`], sorted into the recognized ones and the rest.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MailHeaders {
    /// `Cc` mailboxes; a comma-separated header value is split.
    pub cc: Vec<String>,
    /// `Bcc` mailboxes; a comma-separated header value is split.
    pub bcc: Vec<String>,
    /// The `From` mailbox.
    pub from: Option<String>,
    /// The `Reply-To` mailbox.
    pub reply_to: Option<String>,
    /// The `Sender` mailbox.
    pub sender: Option<String>,
    /// The `Return-Path` address.
    pub return_path: Option<String>,
    /// Every other header, as configured.
    pub other: Vec<(String, String)>,
}

impl MailHeaders {
    fn apply(&mut self, name: &str, value: &str) {
        let list = || {
            value
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect::<Vec<_>>()
        };

        match name.trim().to_ascii_lowercase().as_str() {
            "cc" => self.cc.extend(list()),
            "bcc" => self.bcc.extend(list()),
            "from" => self.from = Some(value.to_string()),
            "reply-to" => self.reply_to = Some(value.to_string()),
            "sender" => self.sender = Some(value.to_string()),
            "return-path" => self.return_path = Some(value.to_string()),
            _ => self.other.push((name.to_string(), value.to_string())),
        }
    }
}

/// A composed message, ready for a [`Mailer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mail {
    /// The subject line.
    pub subject: String,
    /// The recipients.
    pub to: Vec<Recipient>,
    /// The configured headers.
    pub headers: MailHeaders,
    /// The plain text body.
    pub body: String,
}

/// A mail transport that can queue or send a composed message.
pub trait Mailer: fmt::Debug + Send + Sync + 'static {
    /// Queue or send `mail`.
    fn send(&self, mail: &Mail) -> Result<(), Error>;
}

/// A sink that mails records.
///
/// The subject reads `<subject> <NAME> (<rank>)`, and the body is the tab-separated line the
/// plain [`FileSink`](crate::sink::FileSink) format writes.
///
/// # Examples
///
/// ```
/// use sinkforth::Error;
/// use sinkforth::Level;
/// use sinkforth::sink::mail::Mail;
/// use sinkforth::sink::mail::MailOptions;
/// use sinkforth::sink::mail::MailSink;
/// use sinkforth::sink::mail::Mailer;
/// use sinkforth::sink::mail::Recipient;
///
/// #[derive(Debug)]
/// struct Discard;
///
/// impl Mailer for Discard {
///     fn send(&self, _: &Mail) -> Result<(), Error> {
///         Ok(())
///     }
/// }
///
/// let sink = MailSink::new(
///     Discard,
///     [Recipient::named("Ops", "ops@example.com")],
///     MailOptions::new().subject("[app]").header("Reply-To", "noreply@example.com"),
/// )
/// .unwrap()
/// .with_level_limit(Level::Critical);
/// ```
#[derive(Debug)]
pub struct MailSink<M> {
    mailer: M,
    recipients: Vec<Recipient>,
    subject: Option<String>,
    headers: MailHeaders,
    limit: LevelLimit,
}

impl<M: Mailer> MailSink<M> {
    /// Create a sink mailing `recipients` through `mailer`.
    ///
    /// # Errors
    ///
    /// Fails with [`ErrorKind::InvalidArgument`](crate::ErrorKind::InvalidArgument) if there
    /// is no recipient.
    pub fn new<R>(
        mailer: M,
        recipients: impl IntoIterator<Item = R>,
        options: MailOptions,
    ) -> Result<Self, Error>
    where
        R: Into<Recipient>,
    {
        let recipients = recipients.into_iter().map(Into::into).collect::<Vec<Recipient>>();
        if recipients.is_empty() {
            return Err(Error::invalid_argument("mail sink needs at least one recipient"));
        }

        let mut headers = MailHeaders::default();
        for (name, value) in &options.headers {
            headers.apply(name, value);
        }

        Ok(Self {
            mailer,
            recipients,
            subject: options.subject,
            headers,
            limit: LevelLimit::none(),
        })
    }

    /// Set the level ceiling.
    pub fn with_level_limit(mut self, level: Level) -> Self {
        self.limit.set_level(level);
        self
    }

    /// The mailer.
    pub fn mailer(&self) -> &M {
        &self.mailer
    }

    /// The recipients.
    pub fn recipients(&self) -> &[Recipient] {
        &self.recipients
    }

    /// Mail free-form content, bypassing the level ceiling.
    pub fn write_custom(&self, content: &str) -> Result<(), Error> {
        let subject = self
            .subject
            .as_deref()
            .unwrap_or(DEFAULT_CUSTOM_SUBJECT)
            .to_string();
        self.send(subject, format!("{content}\n"))
    }

    fn send(&self, subject: String, body: String) -> Result<(), Error> {
        let mail = Mail {
            subject,
            to: self.recipients.clone(),
            headers: self.headers.clone(),
            body,
        };
        self.mailer.send(&mail)
    }
}

impl<M: Mailer> Sink for MailSink<M> {
    fn write(&self, record: &Record) -> Result<(), Error> {
        if !self.limit.permits(record.level()) {
            return Ok(());
        }

        let subject = format!(
            "{} {} ({})",
            self.subject.as_deref().unwrap_or(DEFAULT_SUBJECT),
            record.name(),
            record.level().rank(),
        );
        let body = TextLayout::default().format(record)?;
        self.send(subject, body)
    }

    fn limit(&self) -> &LevelLimit {
        &self.limit
    }

    fn limit_mut(&mut self) -> &mut LevelLimit {
        &mut self.limit
    }
}

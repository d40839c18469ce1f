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

use std::fmt;

use lettre::Address;
use lettre::Message;
use lettre::Transport;
use lettre::message::Mailbox;
use lettre::message::header::HeaderName;
use lettre::message::header::HeaderValue;

use crate::Error;
use crate::ErrorKind;
use crate::sink::mail::Mail;
use crate::sink::mail::Mailer;

/// A [`Mailer`] delivering through any `lettre` transport.
///
/// The `From` mailbox falls back to `default_from` when the sink has no `From` header.
pub struct LettreMailer<T> {
    transport: T,
    default_from: Mailbox,
}

impl<T> fmt::Debug for LettreMailer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LettreMailer")
            .field("default_from", &self.default_from.to_string())
            .finish_non_exhaustive()
    }
}

impl<T> LettreMailer<T>
where
    T: Transport,
{
    /// Create a mailer sending through `transport`.
    pub fn new(transport: T, default_from: Mailbox) -> Self {
        Self {
            transport,
            default_from,
        }
    }

    /// The transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn compose(&self, mail: &Mail) -> Result<Message, Error> {
        let from = match &mail.headers.from {
            Some(from) => parse_mailbox(from)?,
            None => self.default_from.clone(),
        };

        let mut builder = Message::builder().from(from).subject(mail.subject.clone());
        for recipient in &mail.to {
            let address = recipient.email.parse::<Address>().map_err(|err| {
                Error::invalid_argument("malformed recipient address")
                    .with_context("address", &recipient.email)
                    .with_source(err)
            })?;
            builder = builder.to(Mailbox::new(recipient.name.clone(), address));
        }
        for cc in &mail.headers.cc {
            builder = builder.cc(parse_mailbox(cc)?);
        }
        for bcc in &mail.headers.bcc {
            builder = builder.bcc(parse_mailbox(bcc)?);
        }
        if let Some(reply_to) = &mail.headers.reply_to {
            builder = builder.reply_to(parse_mailbox(reply_to)?);
        }
        if let Some(sender) = &mail.headers.sender {
            builder = builder.sender(parse_mailbox(sender)?);
        }
        if let Some(return_path) = &mail.headers.return_path {
            builder = builder.raw_header(raw_header("Return-Path", return_path)?);
        }
        for (name, value) in &mail.headers.other {
            builder = builder.raw_header(raw_header(name, value)?);
        }

        builder.body(mail.body.clone()).map_err(|err| {
            Error::new(ErrorKind::Mail, "failed to compose log mail").with_source(err)
        })
    }
}

impl<T> Mailer for LettreMailer<T>
where
    T: Transport + Send + Sync + 'static,
    T::Error: std::error::Error + Send + Sync + 'static,
{
    fn send(&self, mail: &Mail) -> Result<(), Error> {
        let message = self.compose(mail)?;
        self.transport.send(&message).map_err(|err| {
            Error::new(ErrorKind::Mail, "failed to send log mail")
                .with_context("subject", &mail.subject)
                .with_source(err)
        })?;
        Ok(())
    }
}

fn parse_mailbox(value: &str) -> Result<Mailbox, Error> {
    value.parse::<Mailbox>().map_err(|err| {
        Error::invalid_argument("malformed mailbox")
            .with_context("mailbox", value)
            .with_source(err)
    })
}

fn raw_header(name: &str, value: &str) -> Result<HeaderValue, Error> {
    let name = HeaderName::new_from_ascii(name.to_string()).map_err(|_| {
        Error::invalid_argument("malformed mail header name").with_context("header", name)
    })?;
    Ok(HeaderValue::new(name, value.to_string()))
}

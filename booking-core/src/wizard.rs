/// Multi-step booking flow for a single service
///
/// Steps only move forward through `next`/`submit`/`complete` and backward
/// one at a time through `back`. A guard that fails leaves the step as is.

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::booking::{BookingDetails, CheckoutRequest};
use crate::pricing;
use crate::service::Service;

lazy_static! {
    static ref EMAIL_SHAPE: Regex = Regex::new(r"^\S+@\S+\.\S+$").expect("email pattern is valid");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WizardStep {
    SelectingDates,
    EnteringDetails,
    Reviewing,
    Submitting,
    Completed,
}

impl WizardStep {
    fn previous(self) -> Option<WizardStep> {
        match self {
            WizardStep::EnteringDetails => Some(WizardStep::SelectingDates),
            WizardStep::Reviewing => Some(WizardStep::EnteringDetails),
            WizardStep::SelectingDates | WizardStep::Submitting | WizardStep::Completed => None,
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WizardError {
    #[error("Please select check-in and check-out dates")]
    MissingDates,
    #[error("Check-out date must be after check-in date")]
    EndNotAfterStart,
    #[error("Please select number of guests")]
    NoGuests,
    #[error("Maximum {max} guests allowed")]
    TooManyGuests { max: u32 },
    #[error("Please fill in all required fields")]
    MissingContact,
    #[error("Please enter a valid email address")]
    InvalidEmail,
    #[error("Cannot go back from {0:?}")]
    CannotGoBack(WizardStep),
    #[error("Action not available while {0:?}")]
    WrongStep(WizardStep),
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_SHAPE.is_match(email.trim())
}

#[derive(Debug, Clone, PartialEq)]
pub struct BookingWizard {
    service: Service,
    step: WizardStep,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub guests: u32,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub special_requests: String,
}

impl BookingWizard {
    pub fn new(service: Service) -> Self {
        Self {
            service,
            step: WizardStep::SelectingDates,
            start_date: None,
            end_date: None,
            guests: 1,
            customer_name: String::new(),
            customer_email: String::new(),
            customer_phone: String::new(),
            special_requests: String::new(),
        }
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn service(&self) -> &Service {
        &self.service
    }

    pub fn nights(&self) -> i64 {
        match (self.start_date, self.end_date) {
            (Some(start), Some(end)) => pricing::nights(start, end).max(0),
            _ => 0,
        }
    }

    pub fn total(&self) -> f64 {
        match (self.start_date, self.end_date) {
            (Some(start), Some(end)) => pricing::booking_total(self.service.base_price, start, end),
            _ => 0.0,
        }
    }

    fn check_dates(&self) -> Result<(), WizardError> {
        let (start, end) = match (self.start_date, self.end_date) {
            (Some(start), Some(end)) => (start, end),
            _ => return Err(WizardError::MissingDates),
        };
        if end <= start {
            return Err(WizardError::EndNotAfterStart);
        }
        if self.guests < 1 {
            return Err(WizardError::NoGuests);
        }
        if let Some(max) = self.service.max_capacity.filter(|max| *max > 0) {
            if self.guests > max {
                return Err(WizardError::TooManyGuests { max });
            }
        }
        Ok(())
    }

    fn check_contact(&self) -> Result<(), WizardError> {
        if self.customer_name.trim().is_empty() || self.customer_email.trim().is_empty() {
            return Err(WizardError::MissingContact);
        }
        if !is_valid_email(&self.customer_email) {
            return Err(WizardError::InvalidEmail);
        }
        Ok(())
    }

    /// Advances past dates or contact details once their guard holds
    pub fn next(&mut self) -> Result<WizardStep, WizardError> {
        let next = match self.step {
            WizardStep::SelectingDates => {
                self.check_dates()?;
                WizardStep::EnteringDetails
            }
            WizardStep::EnteringDetails => {
                self.check_contact()?;
                WizardStep::Reviewing
            }
            other => return Err(WizardError::WrongStep(other)),
        };
        self.step = next;
        Ok(next)
    }

    pub fn back(&mut self) -> Result<WizardStep, WizardError> {
        let previous = self
            .step
            .previous()
            .ok_or(WizardError::CannotGoBack(self.step))?;
        self.step = previous;
        Ok(previous)
    }

    /// Moves from review to submission and builds the checkout request.
    /// Redirect URLs left as `None` are filled in server-side.
    pub fn submit(
        &mut self,
        success_url: Option<String>,
        cancel_url: Option<String>,
    ) -> Result<CheckoutRequest, WizardError> {
        if self.step != WizardStep::Reviewing {
            return Err(WizardError::WrongStep(self.step));
        }
        self.check_dates()?;
        self.check_contact()?;

        let (start_date, end_date) = match (self.start_date, self.end_date) {
            (Some(start), Some(end)) => (start, end),
            _ => return Err(WizardError::MissingDates),
        };
        let special_requests = Some(self.special_requests.trim())
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        let customer_name = self.customer_name.trim().to_string();

        let request = CheckoutRequest {
            service_id: self.service.id,
            service_name: self.service.name.clone(),
            amount: self.total(),
            currency: Some(self.service.currency.clone()),
            customer_email: self.customer_email.trim().to_string(),
            customer_name: Some(customer_name),
            booking_details: BookingDetails {
                start_date,
                end_date,
                guests: self.guests,
                special_requests,
                image: self.service.cover_image().map(str::to_string),
            },
            success_url,
            cancel_url,
        };

        self.step = WizardStep::Submitting;
        Ok(request)
    }

    /// Checkout session created; the browser is leaving for the hosted page
    pub fn complete(&mut self) -> Result<WizardStep, WizardError> {
        if self.step != WizardStep::Submitting {
            return Err(WizardError::WrongStep(self.step));
        }
        self.step = WizardStep::Completed;
        Ok(self.step)
    }

    /// Checkout failed; return to review so the visitor can retry
    pub fn fail(&mut self) -> Result<WizardStep, WizardError> {
        if self.step != WizardStep::Submitting {
            return Err(WizardError::WrongStep(self.step));
        }
        self.step = WizardStep::Reviewing;
        Ok(self.step)
    }
}

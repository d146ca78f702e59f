//! Form validation for everything the user submits.
//!
//! Each form validates locally before any request is made and produces the
//! JSON body the auction API expects. Error messages are user-facing.

use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::types::Media;

/// Email domain allowed to log in and register.
pub const STUDENT_EMAIL_DOMAIN: &str = "@stud.noroff.no";

/// Minimum password length at registration.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Validation error types. `Display` is the message shown to the user.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Login without email or password.
    #[error("Please enter both email and password.")]
    MissingCredentials,

    /// Login with a non-student email.
    #[error("Only @stud.noroff.no addresses may log in.")]
    LoginEmailDomain,

    /// Registration with a required field left blank.
    #[error("Please fill in all required fields.")]
    MissingRequiredFields,

    /// Registration with a non-student email.
    #[error("Only @stud.noroff.no email addresses can register.")]
    RegisterEmailDomain,

    /// Password shorter than [`MIN_PASSWORD_LENGTH`].
    #[error("Password must be at least 8 characters.")]
    PasswordTooShort,

    /// Password and confirmation differ.
    #[error("Passwords do not match.")]
    PasswordMismatch,

    /// Listing without a title.
    #[error("Title is required.")]
    TitleRequired,

    /// End date/time missing or unparseable.
    #[error("Please provide a valid end date and time.")]
    InvalidEndTime,

    /// End date/time not in the future.
    #[error("End time must be in the future.")]
    EndTimeInPast,

    /// Bid amount missing, non-numeric or not positive.
    #[error("Please enter a valid bid amount.")]
    InvalidBidAmount,

    /// Bid not above the current highest bid.
    #[error("Your bid must be higher than the current highest bid ({highest} credits).")]
    BidTooLow {
        /// Current highest bid.
        highest: f64,
    },

    /// Avatar URL without an http(s) scheme.
    #[error("Avatar URL must be a full link starting with http or https.")]
    InvalidAvatarUrl,

    /// Banner URL without an http(s) scheme.
    #[error("Banner URL must be a full link starting with http or https.")]
    InvalidBannerUrl,

    /// Profile update that changes nothing.
    #[error("Please change your bio, avatar or banner before saving.")]
    NothingToUpdate,

    /// Listing lookup without an ID.
    #[error("No listing ID provided.")]
    MissingListingId,
}

/// Whether `email` belongs to the student domain (case-insensitive).
#[must_use]
pub fn is_student_email(email: &str) -> bool {
    email.to_lowercase().ends_with(STUDENT_EMAIL_DOMAIN)
}

/// Free text as sent to the API: trimmed, otherwise as typed.
#[must_use]
pub fn clean_text(input: &str) -> String {
    input.trim().to_string()
}

/// Split a comma-separated tag list, dropping blanks.
#[must_use]
pub fn parse_tags(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// One media entry when a URL was given, otherwise none.
#[must_use]
pub fn build_media(url: &str, alt: &str) -> Vec<Media> {
    if url.trim().is_empty() {
        vec![]
    } else {
        vec![Media::new(url, alt)]
    }
}

/// Combine a local `YYYY-MM-DD` date and `HH:MM` time into a UTC instant.
#[must_use]
pub fn build_ends_at(date: &str, time: &str) -> Option<DateTime<Utc>> {
    let (date, time) = (date.trim(), time.trim());
    if date.is_empty() || time.is_empty() {
        return None;
    }

    let combined = format!("{date}T{time}");
    let naive = NaiveDateTime::parse_from_str(&combined, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(&combined, "%Y-%m-%dT%H:%M:%S"))
        .ok()?;

    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|local| local.with_timezone(&Utc))
}

/// Login form.
#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    /// Email address.
    pub email: String,
    /// Password.
    pub password: String,
}

/// Body of `POST /auth/login`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginRequest {
    /// Email address.
    pub email: String,
    /// Password.
    pub password: String,
}

impl LoginForm {
    /// Validate and build the request body.
    ///
    /// # Errors
    ///
    /// Returns the first failing rule.
    pub fn validate(&self) -> Result<LoginRequest, ValidationError> {
        let email = self.email.trim();
        let password = self.password.trim();

        if email.is_empty() || password.is_empty() {
            return Err(ValidationError::MissingCredentials);
        }
        if !is_student_email(email) {
            return Err(ValidationError::LoginEmailDomain);
        }

        Ok(LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        })
    }
}

/// Registration form.
#[derive(Debug, Clone, Default)]
pub struct RegisterForm {
    /// Profile name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Password.
    pub password: String,
    /// Password confirmation.
    pub confirm_password: String,
    /// Optional avatar URL.
    pub avatar: Option<String>,
    /// Optional banner URL.
    pub banner: Option<String>,
}

/// Body of `POST /auth/register`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisterRequest {
    /// Profile name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Password.
    pub password: String,
    /// Avatar, omitted when blank.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<Media>,
    /// Banner, omitted when blank.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub banner: Option<Media>,
}

impl RegisterForm {
    /// Validate and build the request body.
    ///
    /// # Errors
    ///
    /// Returns the first failing rule.
    pub fn validate(&self) -> Result<RegisterRequest, ValidationError> {
        let name = self.name.trim();
        let email = self.email.trim();
        let password = self.password.trim();
        let confirm = self.confirm_password.trim();

        if name.is_empty() || email.is_empty() || password.is_empty() || confirm.is_empty() {
            return Err(ValidationError::MissingRequiredFields);
        }
        if !is_student_email(email) {
            return Err(ValidationError::RegisterEmailDomain);
        }
        // Counted in UTF-16 units, as the web form does.
        if password.encode_utf16().count() < MIN_PASSWORD_LENGTH {
            return Err(ValidationError::PasswordTooShort);
        }
        if password != confirm {
            return Err(ValidationError::PasswordMismatch);
        }

        let optional_media = |value: &Option<String>| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(|url| Media::new(url, ""))
        };

        Ok(RegisterRequest {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            avatar: optional_media(&self.avatar),
            banner: optional_media(&self.banner),
        })
    }
}

/// Create-listing form, fields as typed by the user.
#[derive(Debug, Clone, Default)]
pub struct ListingForm {
    /// Title.
    pub title: String,
    /// Description.
    pub description: String,
    /// Comma-separated tags.
    pub tags: String,
    /// Main image URL.
    pub media_url: String,
    /// Main image alt text.
    pub media_alt: String,
    /// End date, `YYYY-MM-DD` local.
    pub end_date: String,
    /// End time, `HH:MM` local.
    pub end_time: String,
}

/// Body of `POST /auction/listings`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateListingRequest {
    /// Title.
    pub title: String,
    /// Description (may be empty).
    pub description: String,
    /// Tags.
    pub tags: Vec<String>,
    /// Images.
    pub media: Vec<Media>,
    /// Auction end.
    pub ends_at: DateTime<Utc>,
}

impl ListingForm {
    /// Validate against the current time and build the request body.
    ///
    /// # Errors
    ///
    /// Returns the first failing rule.
    pub fn validate(&self, now: DateTime<Utc>) -> Result<CreateListingRequest, ValidationError> {
        let title = clean_text(&self.title);
        if title.is_empty() {
            return Err(ValidationError::TitleRequired);
        }

        let ends_at =
            build_ends_at(&self.end_date, &self.end_time).ok_or(ValidationError::InvalidEndTime)?;
        if ends_at <= now {
            return Err(ValidationError::EndTimeInPast);
        }

        Ok(CreateListingRequest {
            title,
            description: clean_text(&self.description),
            tags: parse_tags(&self.tags),
            media: build_media(&self.media_url, &self.media_alt),
            ends_at,
        })
    }
}

/// Edit-listing form.
#[derive(Debug, Clone, Default)]
pub struct ListingUpdateForm {
    /// New title.
    pub title: String,
    /// New description.
    pub description: String,
    /// New main image URL, blank keeps the current media.
    pub media_url: String,
    /// New main image alt text.
    pub media_alt: String,
}

/// Body of `PUT /auction/listings/<id>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateListingRequest {
    /// Title.
    pub title: String,
    /// Description (may be empty).
    pub description: String,
    /// Replacement media, omitted to keep the current images.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media: Option<Vec<Media>>,
}

impl ListingUpdateForm {
    /// Validate and build the request body.
    ///
    /// # Errors
    ///
    /// Returns `TitleRequired` for a blank title.
    pub fn validate(&self) -> Result<UpdateListingRequest, ValidationError> {
        let title = clean_text(&self.title);
        if title.is_empty() {
            return Err(ValidationError::TitleRequired);
        }

        let media = build_media(&self.media_url, &self.media_alt);

        Ok(UpdateListingRequest {
            title,
            description: clean_text(&self.description),
            media: (!media.is_empty()).then_some(media),
        })
    }
}

/// Body of `POST /auction/listings/<id>/bids`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BidRequest {
    /// Amount in credits.
    pub amount: f64,
}

/// Parse a bid typed by the user and check it beats `highest`.
///
/// # Errors
///
/// `InvalidBidAmount` for blank, non-numeric or non-positive input,
/// `BidTooLow` when it does not exceed the current highest bid.
pub fn parse_bid(raw: &str, highest: f64) -> Result<BidRequest, ValidationError> {
    let amount: f64 = raw
        .trim()
        .parse()
        .map_err(|_| ValidationError::InvalidBidAmount)?;

    if !amount.is_finite() || amount <= 0.0 {
        return Err(ValidationError::InvalidBidAmount);
    }
    if amount <= highest {
        return Err(ValidationError::BidTooLow { highest });
    }

    Ok(BidRequest { amount })
}

/// Profile edit form.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdateForm {
    /// Bio, always sent.
    pub bio: String,
    /// Avatar URL, blank leaves it unchanged.
    pub avatar_url: String,
    /// Avatar alt text.
    pub avatar_alt: String,
    /// Banner URL, blank leaves it unchanged.
    pub banner_url: String,
    /// Banner alt text.
    pub banner_alt: String,
}

/// Body of `PUT /auction/profiles/<name>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileUpdateRequest {
    /// Bio (may be empty).
    pub bio: String,
    /// New avatar.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<Media>,
    /// New banner.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub banner: Option<Media>,
}

impl ProfileUpdateForm {
    /// Validate against the current bio and build the request body.
    ///
    /// # Errors
    ///
    /// Returns the first failing rule.
    pub fn validate(&self, current_bio: Option<&str>) -> Result<ProfileUpdateRequest, ValidationError> {
        let bio = clean_text(&self.bio);

        let avatar = Self::media_field(&self.avatar_url, &self.avatar_alt)
            .map_err(|()| ValidationError::InvalidAvatarUrl)?;
        let banner = Self::media_field(&self.banner_url, &self.banner_alt)
            .map_err(|()| ValidationError::InvalidBannerUrl)?;

        if avatar.is_none() && banner.is_none() && bio == current_bio.unwrap_or("") {
            return Err(ValidationError::NothingToUpdate);
        }

        Ok(ProfileUpdateRequest { bio, avatar, banner })
    }

    fn media_field(url: &str, alt: &str) -> Result<Option<Media>, ()> {
        let url = url.trim();
        if url.is_empty() {
            return Ok(None);
        }
        if !url.starts_with("http") {
            return Err(());
        }
        Ok(Some(Media::new(url, alt)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_student_email() {
        assert!(is_student_email("kari@stud.noroff.no"));
        assert!(is_student_email("Kari@STUD.Noroff.no"));
        assert!(!is_student_email("kari@noroff.no"));
        assert!(!is_student_email("kari@gmail.com"));
    }

    #[test]
    fn test_login_form() {
        let form = LoginForm {
            email: "  kari@stud.noroff.no ".to_string(),
            password: " hunter22 ".to_string(),
        };
        let req = form.validate().unwrap();
        assert_eq!(req.email, "kari@stud.noroff.no");
        assert_eq!(req.password, "hunter22");

        let blank = LoginForm::default();
        assert_eq!(blank.validate(), Err(ValidationError::MissingCredentials));

        let outsider = LoginForm {
            email: "kari@example.com".to_string(),
            password: "hunter22".to_string(),
        };
        assert_eq!(
            outsider.validate().unwrap_err().to_string(),
            "Only @stud.noroff.no addresses may log in."
        );
    }

    fn register_form() -> RegisterForm {
        RegisterForm {
            name: "kari".to_string(),
            email: "kari@stud.noroff.no".to_string(),
            password: "longenough".to_string(),
            confirm_password: "longenough".to_string(),
            avatar: Some("  ".to_string()),
            banner: Some("https://img.test/banner.png".to_string()),
        }
    }

    #[test]
    fn test_register_form_ok() {
        let req = register_form().validate().unwrap();
        assert_eq!(req.avatar, None);
        assert_eq!(req.banner, Some(Media::new("https://img.test/banner.png", "")));

        let body = serde_json::to_value(&req).unwrap();
        assert!(body.get("avatar").is_none());
    }

    #[test]
    fn test_register_form_rules_in_order() {
        let mut form = register_form();
        form.name = String::new();
        assert_eq!(form.validate(), Err(ValidationError::MissingRequiredFields));

        let mut form = register_form();
        form.email = "kari@uio.no".to_string();
        assert_eq!(form.validate(), Err(ValidationError::RegisterEmailDomain));

        let mut form = register_form();
        form.password = "short".to_string();
        form.confirm_password = "short".to_string();
        assert_eq!(form.validate(), Err(ValidationError::PasswordTooShort));

        let mut form = register_form();
        form.confirm_password = "different1".to_string();
        assert_eq!(form.validate(), Err(ValidationError::PasswordMismatch));
    }

    #[test]
    fn test_parse_tags() {
        assert_eq!(parse_tags(" bike, , red ,"), vec!["bike", "red"]);
        assert!(parse_tags("").is_empty());
    }

    #[test]
    fn test_build_ends_at() {
        assert!(build_ends_at("2099-05-17", "12:30").is_some());
        assert!(build_ends_at("2099-05-17", "12:30:15").is_some());
        assert!(build_ends_at("2099-05-17", "").is_none());
        assert!(build_ends_at("17.05.2099", "12:30").is_none());
    }

    fn listing_form() -> ListingForm {
        ListingForm {
            title: " Blue bike ".to_string(),
            description: String::new(),
            tags: "bike, blue".to_string(),
            media_url: "https://img.test/bike.png".to_string(),
            media_alt: "A bike".to_string(),
            end_date: "2099-01-01".to_string(),
            end_time: "10:00".to_string(),
        }
    }

    #[test]
    fn test_listing_form_ok() {
        let req = listing_form().validate(Utc::now()).unwrap();
        assert_eq!(req.title, "Blue bike");
        assert_eq!(req.description, "");
        assert_eq!(req.tags, vec!["bike", "blue"]);
        assert_eq!(req.media.len(), 1);

        let body = serde_json::to_value(&req).unwrap();
        assert!(body.get("endsAt").is_some());
    }

    #[test]
    fn test_listing_form_rules() {
        let mut form = listing_form();
        form.title = "   ".to_string();
        assert_eq!(form.validate(Utc::now()), Err(ValidationError::TitleRequired));

        let mut form = listing_form();
        form.end_time = String::new();
        assert_eq!(form.validate(Utc::now()), Err(ValidationError::InvalidEndTime));

        let mut form = listing_form();
        form.end_date = "2000-01-01".to_string();
        assert_eq!(form.validate(Utc::now()), Err(ValidationError::EndTimeInPast));

        // Exactly "now" is not in the future
        let form = listing_form();
        let ends = build_ends_at(&form.end_date, &form.end_time).unwrap();
        assert_eq!(form.validate(ends), Err(ValidationError::EndTimeInPast));
        assert!(form.validate(ends - Duration::seconds(1)).is_ok());
    }

    #[test]
    fn test_listing_update_form_keeps_media_when_blank() {
        let form = ListingUpdateForm {
            title: "Bike".to_string(),
            ..Default::default()
        };
        let body = serde_json::to_value(form.validate().unwrap()).unwrap();
        assert_eq!(body, serde_json::json!({"title": "Bike", "description": ""}));
    }

    #[test]
    fn test_parse_bid() {
        assert_eq!(parse_bid(" 150 ", 100.0).unwrap().amount, 150.0);
        assert_eq!(parse_bid("", 0.0), Err(ValidationError::InvalidBidAmount));
        assert_eq!(parse_bid("abc", 0.0), Err(ValidationError::InvalidBidAmount));
        assert_eq!(parse_bid("-5", 0.0), Err(ValidationError::InvalidBidAmount));
        assert_eq!(parse_bid("0", 0.0), Err(ValidationError::InvalidBidAmount));
        assert_eq!(parse_bid("NaN", 0.0), Err(ValidationError::InvalidBidAmount));

        let err = parse_bid("100", 100.0).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Your bid must be higher than the current highest bid (100 credits)."
        );
    }

    #[test]
    fn test_profile_update_form() {
        let form = ProfileUpdateForm {
            bio: "Same".to_string(),
            ..Default::default()
        };
        assert_eq!(form.validate(Some("Same")), Err(ValidationError::NothingToUpdate));
        assert!(form.validate(Some("Old")).is_ok());

        // Clearing an existing bio is a change
        let cleared = ProfileUpdateForm::default();
        assert_eq!(cleared.validate(Some("Old")).unwrap().bio, "");

        let bad_avatar = ProfileUpdateForm {
            avatar_url: "img.test/a.png".to_string(),
            ..Default::default()
        };
        assert_eq!(bad_avatar.validate(None), Err(ValidationError::InvalidAvatarUrl));

        let bad_banner = ProfileUpdateForm {
            banner_url: "ftp://img.test/b.png".to_string(),
            ..Default::default()
        };
        assert_eq!(bad_banner.validate(None), Err(ValidationError::InvalidBannerUrl));

        let ok = ProfileUpdateForm {
            avatar_url: "https://img.test/a.png".to_string(),
            avatar_alt: "Me".to_string(),
            ..Default::default()
        };
        let req = ok.validate(None).unwrap();
        assert_eq!(req.avatar, Some(Media::new("https://img.test/a.png", "Me")));
        assert_eq!(req.banner, None);
    }

    #[test]
    fn test_text_is_only_trimmed() {
        assert_eq!(clean_text("  hi there\n "), "hi there");

        let form = ListingUpdateForm {
            title: " Ｂｉｋｅ ① ﬁne ".to_string(),
            description: "x²".to_string(),
            ..Default::default()
        };
        let req = form.validate().unwrap();
        assert_eq!(req.title, "Ｂｉｋｅ ① ﬁne");
        assert_eq!(req.description, "x²");

        let profile = ProfileUpdateForm {
            bio: "Ｃｏｌｌｅｃｔｏｒ ﬀ".to_string(),
            ..Default::default()
        };
        assert_eq!(profile.validate(None).unwrap().bio, "Ｃｏｌｌｅｃｔｏｒ ﬀ");
    }

    #[test]
    fn test_password_length_in_utf16_units() {
        let mut form = register_form();
        form.password = "😀😀😀😀".to_string();
        form.confirm_password = "😀😀😀😀".to_string();
        assert!(form.validate().is_ok());

        form.password = "ééééééé".to_string();
        form.confirm_password = "ééééééé".to_string();
        assert_eq!(form.validate(), Err(ValidationError::PasswordTooShort));
    }
}

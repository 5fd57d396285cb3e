// src/sinks/sheets.rs

//! A [`RowForwarder`] appending rows to a Google Sheets spreadsheet,
//! authorized by a service-account credential document.
//!
//! Only built with cargo feature `sheets`.
//!
//! The authorization flow:
//! 1. read the service-account document (`client_email`, `private_key`,
//!    `token_uri`)
//! 2. sign a JWT assertion with the private key and exchange it at
//!    `token_uri` for a bearer token
//! 3. find the spreadsheet by name with the Drive API
//! 4. find the title of the spreadsheet's first sheet
//!
//! The result is kept as an [`Authorized`] and reused for every row until
//! the bearer token nears expiry.
//!
//! [`RowForwarder`]: crate::sinks::remote::RowForwarder

use crate::common::FPath;
use crate::data::record::RECORD_COLUMNS;
use crate::sinks::remote::{ForwardError, RowForwarder};

use std::time::{Duration, Instant};

use ::chrono::Utc;
use ::jsonwebtoken::{Algorithm, EncodingKey, Header};
use ::reqwest::blocking::{Client, Response};
use ::reqwest::{StatusCode, Url};
use ::serde::{Deserialize, Serialize};
#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// constants
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub const TOKEN_URI_DEFAULT: &str = "https://oauth2.googleapis.com/token";

pub const SCOPES: &str = "https://www.googleapis.com/auth/spreadsheets https://www.googleapis.com/auth/drive";

const GRANT_TYPE_JWT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

const DRIVE_FILES_URL: &str = "https://www.googleapis.com/drive/v3/files";

const SHEETS_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets";

const MIME_SPREADSHEET: &str = "application/vnd.google-apps.spreadsheet";

/// Lifetime requested for each signed assertion.
const ASSERTION_LIFETIME_S: i64 = 3600;

/// Renew the bearer token this long before it expires.
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// A hung request stalls the session loop for at most this long.
const HTTP_TIMEOUT: Duration = Duration::from_secs(20);

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// wire types
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

fn token_uri_default() -> String {
    String::from(TOKEN_URI_DEFAULT)
}

/// The fields used from a service-account credential document.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "token_uri_default")]
    pub token_uri: String,
}

impl ServiceAccountKey {
    pub fn from_json(data: &str) -> Result<ServiceAccountKey, ForwardError> {
        ::serde_json::from_str(data).map_err(|err| ForwardError::Credentials(err.to_string()))
    }

    pub fn from_file(path: &FPath) -> Result<ServiceAccountKey, ForwardError> {
        let data = std::fs::read_to_string(path)
            .map_err(|err| ForwardError::Credentials(format!("{} {:?}", err, path)))?;

        ServiceAccountKey::from_json(&data)
    }
}

#[derive(Debug, Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: u64,
}

#[derive(Debug, Deserialize)]
struct DriveFile {
    id: String,
}

#[derive(Debug, Deserialize)]
struct DriveFileList {
    #[serde(default)]
    files: Vec<DriveFile>,
}

#[derive(Debug, Deserialize)]
struct SheetProperties {
    title: String,
}

#[derive(Debug, Deserialize)]
struct Sheet {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
struct Spreadsheet {
    #[serde(default)]
    sheets: Vec<Sheet>,
}

#[derive(Debug, Serialize)]
struct ValueRange<'a> {
    values: [&'a [&'a str; RECORD_COLUMNS]; 1],
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// helpers
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Escape `value` for use inside a single-quoted Drive API query string.
pub fn escape_query_value(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('\'', "\\'")
}

/// The Drive API query finding a spreadsheet named `name`.
pub fn spreadsheet_query(name: &str) -> String {
    format!(
        "name = '{}' and mimeType = '{}' and trashed = false",
        escape_query_value(name),
        MIME_SPREADSHEET,
    )
}

/// A1 notation range covering the whole sheet titled `title`.
pub fn sheet_range(title: &str) -> String {
    format!("'{}'", title.replace('\'', "''"))
}

/// URL of the `values:append` call for `range` of spreadsheet `id`.
pub fn values_append_url(
    id: &str,
    range: &str,
) -> Result<Url, ForwardError> {
    let mut url = Url::parse(SHEETS_URL).map_err(|err| ForwardError::Service(err.to_string()))?;
    url.path_segments_mut()
        .map_err(|_| ForwardError::Service(format!("cannot extend URL {:?}", SHEETS_URL)))?
        .push(id)
        .push("values")
        .push(&format!("{}:append", range));

    Ok(url)
}

fn network_error(err: ::reqwest::Error) -> ForwardError {
    ForwardError::Network(err.to_string())
}

/// Turn a non-success `response` into a `ForwardError`.
fn check_status(response: Response) -> Result<Response, ForwardError> {
    let status: StatusCode = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body: String = response.text().unwrap_or_default();
    let msg = format!("{} {}", status, body.trim());
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(ForwardError::Auth(msg)),
        _ => Err(ForwardError::Service(msg)),
    }
}

/// Does a failed append with `status` make the cached [`Authorized`] stale?
///
/// * 401, 403: the token was revoked or expired early.
/// * 404: the spreadsheet was deleted, possibly recreated under the same name.
/// * 400: the first sheet was renamed or removed, so the range no longer
///   parses.
pub fn session_invalidated(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::NOT_FOUND | StatusCode::BAD_REQUEST
    )
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// SheetsClient
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// An authenticated session with the target spreadsheet resolved.
#[derive(Clone, Debug)]
pub struct Authorized {
    access_token: String,
    expires_at: Instant,
    spreadsheet_id: String,
    sheet_title: String,
}

impl Authorized {
    /// Is the bearer token usable at `now`?
    pub fn is_fresh(
        &self,
        now: Instant,
    ) -> bool {
        now < self.expires_at
    }
}

/// Appends rows to the first sheet of the spreadsheet named `sheet_name`.
pub struct SheetsClient {
    credentials_path: FPath,
    sheet_name: String,
    http: Option<Client>,
    session: Option<Authorized>,
}

impl SheetsClient {
    /// Nothing is read or connected until the first row is appended.
    pub fn new(
        credentials_path: &FPath,
        sheet_name: &str,
    ) -> SheetsClient {
        SheetsClient {
            credentials_path: credentials_path.clone(),
            sheet_name: String::from(sheet_name),
            http: None,
            session: None,
        }
    }

    fn http(&mut self) -> Result<Client, ForwardError> {
        if let Some(http) = &self.http {
            return Ok(http.clone());
        }
        let http: Client = Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(network_error)?;
        self.http = Some(http.clone());

        Ok(http)
    }

    /// Exchange a signed assertion for a bearer token.
    /// Returns the token and its lifetime.
    fn fetch_token(
        http: &Client,
        key: &ServiceAccountKey,
    ) -> Result<(String, Duration), ForwardError> {
        defn!("({:?})", key.client_email);
        let iat: i64 = Utc::now().timestamp();
        let claims = Claims {
            iss: &key.client_email,
            scope: SCOPES,
            aud: &key.token_uri,
            iat,
            exp: iat + ASSERTION_LIFETIME_S,
        };
        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
            .map_err(|err| ForwardError::Credentials(err.to_string()))?;
        let assertion: String = ::jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &encoding_key)
            .map_err(|err| ForwardError::Credentials(err.to_string()))?;
        let response = http
            .post(&key.token_uri)
            .form(&[("grant_type", GRANT_TYPE_JWT), ("assertion", assertion.as_str())])
            .send()
            .map_err(network_error)?;
        // the token endpoint answers a bad assertion with 400
        let response = check_status(response).map_err(|err| match err {
            ForwardError::Service(msg) => ForwardError::Auth(msg),
            err => err,
        })?;
        let token: TokenResponse = response.json().map_err(network_error)?;
        defx!("expires_in {}", token.expires_in);

        Ok((token.access_token, Duration::from_secs(token.expires_in)))
    }

    fn find_spreadsheet(
        http: &Client,
        token: &str,
        name: &str,
    ) -> Result<String, ForwardError> {
        let query: String = spreadsheet_query(name);
        let response = http
            .get(DRIVE_FILES_URL)
            .bearer_auth(token)
            .query(&[("q", query.as_str()), ("fields", "files(id)")])
            .send()
            .map_err(network_error)?;
        let list: DriveFileList = check_status(response)?
            .json()
            .map_err(network_error)?;
        match list.files.into_iter().next() {
            Some(file) => Ok(file.id),
            None => Err(ForwardError::Service(format!(
                "spreadsheet {:?} not found or not shared with the service account",
                name
            ))),
        }
    }

    fn first_sheet_title(
        http: &Client,
        token: &str,
        id: &str,
    ) -> Result<String, ForwardError> {
        let url = format!("{}/{}", SHEETS_URL, id);
        let response = http
            .get(url)
            .bearer_auth(token)
            .query(&[("fields", "sheets.properties.title")])
            .send()
            .map_err(network_error)?;
        let spreadsheet: Spreadsheet = check_status(response)?
            .json()
            .map_err(network_error)?;
        match spreadsheet.sheets.into_iter().next() {
            Some(sheet) => Ok(sheet.properties.title),
            None => Err(ForwardError::Service(format!("spreadsheet {:?} has no sheets", id))),
        }
    }

    /// Establish a session, or reuse the current one if still fresh.
    fn authorize(&mut self) -> Result<Authorized, ForwardError> {
        if let Some(session) = &self.session {
            if session.is_fresh(Instant::now()) {
                return Ok(session.clone());
            }
            defo!("bearer token expired");
        }
        let http: Client = self.http()?;
        let key: ServiceAccountKey = ServiceAccountKey::from_file(&self.credentials_path)?;
        let (access_token, lifetime) = SheetsClient::fetch_token(&http, &key)?;
        let spreadsheet_id: String = SheetsClient::find_spreadsheet(&http, &access_token, &self.sheet_name)?;
        let sheet_title: String = SheetsClient::first_sheet_title(&http, &access_token, &spreadsheet_id)?;
        let session = Authorized {
            access_token,
            expires_at: Instant::now() + lifetime.saturating_sub(TOKEN_EXPIRY_MARGIN),
            spreadsheet_id,
            sheet_title,
        };
        defo!("authorized; spreadsheet {:?} sheet {:?}", session.spreadsheet_id, session.sheet_title);
        self.session = Some(session.clone());

        Ok(session)
    }
}

impl RowForwarder for SheetsClient {
    fn append_row(
        &mut self,
        row: &[&str; RECORD_COLUMNS],
    ) -> Result<(), ForwardError> {
        defn!();
        let session: Authorized = self.authorize()?;
        let http: Client = self.http()?;
        let url: Url = values_append_url(&session.spreadsheet_id, &sheet_range(&session.sheet_title))?;
        let body = ValueRange { values: [row] };
        let response = http
            .post(url)
            .bearer_auth(&session.access_token)
            .query(&[("valueInputOption", "RAW"), ("insertDataOption", "INSERT_ROWS")])
            .json(&body)
            .send()
            .map_err(network_error)?;
        let status: StatusCode = response.status();
        if let Err(err) = check_status(response) {
            if session_invalidated(status) {
                // authorize and look up the spreadsheet anew next time
                self.session = None;
            }
            defx!("error {:?}", err);
            return Err(err);
        }
        defx!();

        Ok(())
    }

    fn target(&self) -> String {
        format!("spreadsheet {:?}", self.sheet_name)
    }
}

//! Browser implementations of the platform capabilities: `navigator.credentials`
//! for ceremonies and `window.location` / `document.title` for the origin.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use async_trait::async_trait;
use js_sys::{Array, Function, Object, Promise, Reflect, Uint8Array};
use log::debug;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::AbortController;

use crate::error::{PasskeyIdentityError, PasskeyResult};
use crate::identity::CredentialsContainer;
use crate::options::OriginResolver;
use crate::types::webauthn::{
    AuthenticatorAssertionResponse, AuthenticatorAttestationResponse, AuthenticatorResponse,
    PublicKeyCredential, PublicKeyCredentialCreationOptions, PublicKeyCredentialRequestOptions,
};

// === ORIGIN ===

/// Reads the origin and title of the current page
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserOrigin;

impl OriginResolver for BrowserOrigin {
    fn origin(&self) -> PasskeyResult<String> {
        let window = web_sys::window()
            .ok_or_else(|| PasskeyIdentityError::Hostname("window is undefined".to_string()))?;
        window
            .location()
            .origin()
            .map_err(|e| PasskeyIdentityError::Hostname(format!("{e:?}")))
    }

    fn title(&self) -> Option<String> {
        web_sys::window()?.document().map(|document| document.title())
    }
}

// === CEREMONIES ===

/// `navigator.credentials` with an `AbortController` deadline per call
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserCredentials;

impl BrowserCredentials {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait(?Send)]
impl CredentialsContainer for BrowserCredentials {
    async fn create(
        &self,
        options: &PublicKeyCredentialCreationOptions,
        timeout: Duration,
    ) -> PasskeyResult<Option<PublicKeyCredential>> {
        let public_key = to_js(options)?;
        match run_ceremony("create", &public_key, timeout).await? {
            Some(credential) => Ok(Some(parse_credential(&credential)?)),
            None => Ok(None),
        }
    }

    async fn get(
        &self,
        options: &PublicKeyCredentialRequestOptions,
        timeout: Duration,
    ) -> PasskeyResult<Option<PublicKeyCredential>> {
        let public_key = to_js(options)?;
        match run_ceremony("get", &public_key, timeout).await? {
            Some(credential) => Ok(Some(parse_credential(&credential)?)),
            None => Ok(None),
        }
    }
}

fn to_js<T: serde::Serialize>(options: &T) -> PasskeyResult<JsValue> {
    serde_wasm_bindgen::to_value(options)
        .map_err(|e| PasskeyIdentityError::Ceremony(format!("failed to convert options: {e}")))
}

fn ceremony_error(e: JsValue) -> PasskeyIdentityError {
    PasskeyIdentityError::Ceremony(format!("{e:?}"))
}

/// Call `navigator.credentials[method]({ publicKey, signal })`, aborting after `timeout`
async fn run_ceremony(
    method: &str,
    public_key: &JsValue,
    timeout: Duration,
) -> PasskeyResult<Option<JsValue>> {
    let timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
    let window = web_sys::window()
        .ok_or_else(|| PasskeyIdentityError::Ceremony("window is undefined".to_string()))?;

    let controller = AbortController::new().map_err(ceremony_error)?;
    let options = Object::new();
    js_set(&options, "publicKey", public_key)?;
    js_set(&options, "signal", &controller.signal())?;

    let timed_out = Rc::new(Cell::new(false));
    let abort: Closure<dyn FnMut()> = {
        let timed_out = Rc::clone(&timed_out);
        Closure::once(move || {
            timed_out.set(true);
            controller.abort();
        })
    };
    let timer = window
        .set_timeout_with_callback_and_timeout_and_arguments_0(
            abort.as_ref().unchecked_ref(),
            i32::try_from(timeout_ms).unwrap_or(i32::MAX),
        )
        .map_err(ceremony_error)?;

    debug!("navigator.credentials.{}() with {} ms deadline", method, timeout_ms);
    let container = get_credentials_container()?;
    let call: Function = js_get(&container, method)?.unchecked_into();
    let result = match call.call1(&container, &options) {
        Ok(promise) => JsFuture::from(promise.unchecked_into::<Promise>()).await,
        Err(e) => Err(e),
    };
    window.clear_timeout_with_handle(timer);
    drop(abort);

    match result {
        Ok(value) if value.is_null() || value.is_undefined() => Ok(None),
        Ok(value) => Ok(Some(value)),
        Err(_) if timed_out.get() => Err(PasskeyIdentityError::CeremonyTimeout { timeout_ms }),
        Err(e) => Err(ceremony_error(e)),
    }
}

// === RESPONSE PARSING ===

fn parse_credential(credential: &JsValue) -> PasskeyResult<PublicKeyCredential> {
    let raw_id = buffer_to_vec(&js_get(credential, "rawId")?);
    let credential_type = js_get(credential, "type")?.as_string().unwrap_or_default();
    let authenticator_attachment = js_get(credential, "authenticatorAttachment")?.as_string();

    let response = js_get(credential, "response")?;
    let client_data_json = buffer_to_vec(&js_get(&response, "clientDataJSON")?);

    let attestation_object = optional_buffer(&js_get(&response, "attestationObject")?);
    let response = match attestation_object {
        Some(attestation_object) => {
            AuthenticatorResponse::Attestation(AuthenticatorAttestationResponse {
                client_data_json,
                attestation_object: Some(attestation_object),
                transports: transports(&response),
            })
        }
        None => AuthenticatorResponse::Assertion(AuthenticatorAssertionResponse {
            client_data_json,
            authenticator_data: optional_buffer(&js_get(&response, "authenticatorData")?),
            signature: optional_buffer(&js_get(&response, "signature")?),
            user_handle: optional_buffer(&js_get(&response, "userHandle")?),
        }),
    };

    Ok(PublicKeyCredential {
        raw_id,
        credential_type,
        authenticator_attachment,
        response,
    })
}

fn transports(response: &JsValue) -> Vec<String> {
    let Ok(get_transports) = js_get(response, "getTransports")
        .and_then(|f| f.dyn_into::<Function>().map_err(ceremony_error))
    else {
        return Vec::new();
    };
    match get_transports.call0(response) {
        Ok(list) => Array::from(&list).iter().filter_map(|t| t.as_string()).collect(),
        Err(_) => Vec::new(),
    }
}

// === JS HELPERS ===

fn js_get(target: &JsValue, key: &str) -> PasskeyResult<JsValue> {
    Reflect::get(target, &JsValue::from_str(key)).map_err(ceremony_error)
}

fn js_set(target: &JsValue, key: &str, value: &JsValue) -> PasskeyResult<()> {
    Reflect::set(target, &JsValue::from_str(key), value)
        .map(|_| ())
        .map_err(ceremony_error)
}

fn buffer_to_vec(value: &JsValue) -> Vec<u8> {
    Uint8Array::new(value).to_vec()
}

fn optional_buffer(value: &JsValue) -> Option<Vec<u8>> {
    if value.is_null() || value.is_undefined() {
        None
    } else {
        Some(buffer_to_vec(value))
    }
}

fn get_credentials_container() -> PasskeyResult<JsValue> {
    let navigator = js_get(&js_sys::global(), "navigator")?;
    if navigator.is_undefined() {
        return Err(PasskeyIdentityError::Ceremony(
            "navigator is undefined".to_string(),
        ));
    }
    let credentials = js_get(&navigator, "credentials")?;
    if credentials.is_undefined() {
        return Err(PasskeyIdentityError::Ceremony(
            "navigator.credentials is undefined".to_string(),
        ));
    }
    Ok(credentials)
}

//! Extractors whose rejections answer with the API's `{"error": ..}` body.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        FromRequest, FromRequestParts, Query,
    },
    Json,
};

use crate::error::BillingError;

#[derive(FromRequest)]
#[from_request(via(Json), rejection(BillingError))]
pub(super) struct JsonBody<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(Query), rejection(BillingError))]
pub(super) struct QueryParams<T>(pub T);

impl From<JsonRejection> for BillingError {
    fn from(rejection: JsonRejection) -> Self {
        BillingError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for BillingError {
    fn from(rejection: QueryRejection) -> Self {
        BillingError::BadRequest(rejection.body_text())
    }
}

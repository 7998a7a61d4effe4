//! ERP goods-movement protocol types
//!
//! Body and response of the middleware's bulk goods-movement endpoint
//! (a BAPI_GOODSMVT_CREATE bridge). Field names are fixed by the middleware.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// `Return[].TYPE` values that mark a business failure
pub const ERROR_MESSAGE_TYPES: [&str; 3] = ["E", "I", "A"];

/// Bulk posting request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoodsMovementRequest {
    #[serde(rename = "ConnectionParams")]
    pub connection: ConnectionParams,
    #[serde(rename = "GOODSMVT_CODE")]
    pub code: GoodsMovementCode,
    #[serde(rename = "GOODSMVT_HEADER")]
    pub header: GoodsMovementHeader,
    #[serde(rename = "GOODSMVT_ITEM")]
    pub items: Vec<GoodsMovementItem>,
    #[serde(rename = "TESTRUN")]
    pub test_run: bool,
}

/// RFC connection descriptor forwarded to the middleware
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionParams {
    pub ashost: String,
    pub sysnr: String,
    pub client: String,
    pub user: String,
    pub passwd: String,
    pub lang: String,
}

impl fmt::Debug for ConnectionParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionParams")
            .field("ashost", &self.ashost)
            .field("sysnr", &self.sysnr)
            .field("client", &self.client)
            .field("user", &self.user)
            .field("passwd", &"***")
            .field("lang", &self.lang)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoodsMovementCode {
    #[serde(rename = "GM_CODE")]
    pub gm_code: String,
}

/// Document header shared by all line items of one call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct GoodsMovementHeader {
    /// Posting date, `dd.mm.yyyy`
    pub pstng_date: String,
    /// Document date, `dd.mm.yyyy`
    pub doc_date: String,
    pub header_txt: String,
    pub pr_uname: String,
}

/// One line item
///
/// `ENTRY_QNT` and `PO_PR_QNT` always carry the same quantity, the
/// middleware reads one or the other depending on the movement type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct GoodsMovementItem {
    pub material: String,
    pub plant: String,
    pub stge_loc: String,
    pub batch: String,
    pub move_type: String,
    pub stck_type: String,
    pub item_text: String,
    pub entry_qnt: Decimal,
    pub entry_uom: String,
    pub entry_uom_iso: String,
    pub po_pr_qnt: Decimal,
    pub orderid: String,
    pub mvt_ind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub move_stloc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub costcenter: Option<String>,
}

/// Bulk posting response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GoodsMovementResponse {
    #[serde(rename = "Return", default)]
    pub messages: Vec<ReturnMessage>,
    #[serde(rename = "GoodsMovementHeadRet", default)]
    pub head: Option<GoodsMovementHeadRet>,
    /// String or number depending on middleware version
    #[serde(rename = "MatDocumentYear", default)]
    pub document_year: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnMessage {
    #[serde(rename = "TYPE", default)]
    pub kind: String,
    #[serde(rename = "MESSAGE", default)]
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoodsMovementHeadRet {
    #[serde(rename = "MAT_DOC", default)]
    pub mat_doc: Option<String>,
}

impl GoodsMovementResponse {
    /// First return message whose type is in [`ERROR_MESSAGE_TYPES`]
    pub fn business_error(&self) -> Option<&ReturnMessage> {
        self.messages
            .iter()
            .find(|m| ERROR_MESSAGE_TYPES.contains(&m.kind.trim()))
    }

    /// Material document number, if the ERP issued one
    pub fn material_document(&self) -> Option<&str> {
        self.head
            .as_ref()
            .and_then(|h| h.mat_doc.as_deref())
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    pub fn year(&self) -> String {
        match &self.document_year {
            Some(serde_json::Value::String(s)) => s.trim().to_string(),
            Some(serde_json::Value::Number(n)) => n.to_string(),
            _ => String::new(),
        }
    }
}

//! ERP goods-movement posting
//!
//! ```text
//! records ──build_request──▶ GoodsMovementRequest ──ErpClient──▶ GoodsMovementResponse
//!                                                                     │
//!                                                    Submitter::interpret
//!                                                                     ▼
//!                                                            ProcessingResult
//! ```
//!
//! Transport problems are `ErpError` faults. ERP-side rejections come back as
//! `Ok(ProcessingResult { success: false, .. })`.

mod client;
mod request;
mod submit;

pub use client::{ErpClient, ErpError, HttpErpClient};
pub use request::{build_request, ITEM_TEXT_MAX, MATERIAL_WIDTH, ORDER_WIDTH};
pub use submit::Submitter;

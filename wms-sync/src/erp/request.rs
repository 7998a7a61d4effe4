//! Build a `GOODSMVT` request from a batch of pending records

use shared::erp::{
    ConnectionParams, GoodsMovementCode, GoodsMovementHeader, GoodsMovementItem,
    GoodsMovementRequest,
};
use shared::models::{ModuleKind, PendingTransactionRecord};
use shared::util::{truncate_chars, zero_pad};

/// ERP material number width
pub const MATERIAL_WIDTH: usize = 18;
/// ERP order number width
pub const ORDER_WIDTH: usize = 12;
/// Maximum item text length
pub const ITEM_TEXT_MAX: usize = 45;
const HEADER_TEXT_MAX: usize = 25;

fn text(value: &Option<String>) -> String {
    value.as_deref().map(str::trim).unwrap_or_default().to_string()
}

fn present(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn build_item(module: ModuleKind, record: &PendingTransactionRecord) -> GoodsMovementItem {
    let item_text = present(&record.item_text).unwrap_or_else(|| record.identifier());
    let mvt_ind = present(&record.movement_indicator)
        .unwrap_or_else(|| module.default_movement_indicator().to_string());

    GoodsMovementItem {
        material: zero_pad(&text(&record.material), MATERIAL_WIDTH),
        plant: text(&record.plant),
        stge_loc: text(&record.storage_location),
        batch: text(&record.batch),
        move_type: text(&record.movement_type),
        stck_type: text(&record.stock_type),
        item_text: truncate_chars(&item_text, ITEM_TEXT_MAX),
        entry_qnt: record.quantity,
        entry_uom: text(&record.unit),
        entry_uom_iso: text(&record.unit_iso),
        po_pr_qnt: record.quantity,
        orderid: present(&record.order_number)
            .map(|o| zero_pad(&o, ORDER_WIDTH))
            .unwrap_or_default(),
        mvt_ind,
        move_stloc: present(&record.dest_storage_location),
        costcenter: present(&record.cost_center),
    }
}

/// One request for the whole batch; header fields come from the first record
///
/// `posting_date` is already formatted `dd.mm.yyyy` and used for both
/// posting and document date.
pub fn build_request(
    module: ModuleKind,
    records: &[PendingTransactionRecord],
    connection: &ConnectionParams,
    posting_date: &str,
) -> GoodsMovementRequest {
    let first = records.first();
    let gm_code = first
        .and_then(|r| present(&r.gm_code))
        .unwrap_or_else(|| module.default_gm_code().to_string());
    let user = first.map(|r| r.user.trim().to_string()).unwrap_or_default();

    GoodsMovementRequest {
        connection: connection.clone(),
        code: GoodsMovementCode { gm_code },
        header: GoodsMovementHeader {
            pstng_date: posting_date.to_string(),
            doc_date: posting_date.to_string(),
            header_txt: truncate_chars(module.header_text(), HEADER_TEXT_MAX),
            pr_uname: user,
        },
        items: records.iter().map(|r| build_item(module, r)).collect(),
        test_run: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn receipt() -> PendingTransactionRecord {
        PendingTransactionRecord {
            serial: Some("PAL0001".into()),
            material: Some("4711".into()),
            batch: Some("B1".into()),
            movement_type: Some("101".into()),
            plant: Some("1000".into()),
            storage_location: Some("0001".into()),
            quantity: Decimal::new(125, 1),
            unit: Some("KG".into()),
            unit_iso: Some("KGM".into()),
            order_number: Some("1000123".into()),
            user: "jdoe".into(),
            ..PendingTransactionRecord::new(ModuleKind::GoodsReceipt)
        }
    }

    #[test]
    fn test_item_fields_are_padded_and_duplicated() {
        let req = build_request(
            ModuleKind::GoodsReceipt,
            &[receipt()],
            &ConnectionParams::default(),
            "05.03.2024",
        );

        assert_eq!(req.code.gm_code, "02");
        assert_eq!(req.header.pstng_date, "05.03.2024");
        assert_eq!(req.header.doc_date, "05.03.2024");
        assert_eq!(req.header.pr_uname, "jdoe");
        assert!(!req.test_run);

        let item = &req.items[0];
        assert_eq!(item.material, "000000000000004711");
        assert_eq!(item.orderid, "000001000123");
        assert_eq!(item.entry_qnt, Decimal::new(125, 1));
        assert_eq!(item.po_pr_qnt, item.entry_qnt);
        assert_eq!(item.mvt_ind, "F");
        assert_eq!(item.item_text, "PAL0001");
        assert_eq!(item.move_stloc, None);
        assert_eq!(item.costcenter, None);
    }

    #[test]
    fn test_gm_code_override_from_first_record() {
        let mut first = receipt();
        first.gm_code = Some("01".into());
        let req = build_request(
            ModuleKind::GoodsReceipt,
            &[first, receipt()],
            &ConnectionParams::default(),
            "05.03.2024",
        );
        assert_eq!(req.code.gm_code, "01");
        assert_eq!(req.items.len(), 2);
    }

    #[test]
    fn test_optional_fields_only_when_present() {
        let record = PendingTransactionRecord {
            log_id: Some(77),
            material: Some("MAT-A".into()),
            batch: Some("B1".into()),
            dest_storage_location: Some("0002".into()),
            cost_center: Some("  ".into()),
            item_text: Some("x".repeat(60)),
            quantity: Decimal::ONE,
            ..PendingTransactionRecord::new(ModuleKind::InternalTransfer)
        };
        let req = build_request(
            ModuleKind::InternalTransfer,
            &[record],
            &ConnectionParams::default(),
            "05.03.2024",
        );

        let item = &req.items[0];
        assert_eq!(req.code.gm_code, "04");
        assert_eq!(item.material, "MAT-A");
        assert_eq!(item.move_stloc.as_deref(), Some("0002"));
        assert_eq!(item.costcenter, None);
        assert_eq!(item.item_text.chars().count(), ITEM_TEXT_MAX);
        assert_eq!(item.orderid, "");
        assert_eq!(item.mvt_ind, "");
    }

    #[test]
    fn test_item_text_defaults_to_log_id() {
        let record = PendingTransactionRecord {
            log_id: Some(77),
            quantity: Decimal::ONE,
            ..PendingTransactionRecord::new(ModuleKind::Picking)
        };
        let req = build_request(
            ModuleKind::Picking,
            &[record],
            &ConnectionParams::default(),
            "05.03.2024",
        );
        assert_eq!(req.items[0].item_text, "77");
        assert_eq!(req.code.gm_code, "03");
    }
}

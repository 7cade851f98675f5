//! Invoice draft session
//!
//! Holds the invoice being edited: parties, header, line items, tax
//! rates, and watermark. Every item edit recomputes that item's amount;
//! totals are derived on demand.

use crate::config::settings::Settings;
use crate::error::{GstBillError, GstBillResult};
use crate::models::{
    CompanyDetails, InvoiceDraft, InvoiceItem, InvoiceMetaPatch, InvoiceTotals, Money,
    PartyPatch, Taxes, TaxesPatch,
};
use crate::storage::{DraftRepository, ProductRepository};

use super::invoice::InvoiceCalculator;

/// Partial update for the watermark
#[derive(Debug, Clone, Default)]
pub struct WatermarkPatch {
    pub text: Option<String>,
    pub enabled: Option<bool>,
}

/// An invoice being edited
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InvoiceDraftSession {
    draft: InvoiceDraft,
}

impl InvoiceDraftSession {
    /// Start an empty invoice
    pub fn new() -> Self {
        Self::default()
    }

    /// Start an empty invoice with the configured default tax rates
    pub fn from_settings(settings: &Settings) -> Self {
        let mut session = Self::new();
        session.draft.taxes = default_taxes(settings);
        session
    }

    /// Resume a previously saved draft
    ///
    /// Stored amounts are not trusted; each is recomputed from qty and rate.
    pub fn from_draft(mut draft: InvoiceDraft) -> Self {
        draft.items.iter_mut().for_each(InvoiceItem::recompute);
        Self { draft }
    }

    /// Resume the saved draft, or start a new one with configured defaults
    pub fn resume(repo: &DraftRepository, settings: &Settings) -> GstBillResult<Self> {
        Ok(match repo.load()? {
            Some(draft) => Self::from_draft(draft),
            None => Self::from_settings(settings),
        })
    }

    /// Persist the draft
    pub fn save(&self, repo: &DraftRepository) -> GstBillResult<()> {
        repo.save(&self.draft)
    }

    pub fn draft(&self) -> &InvoiceDraft {
        &self.draft
    }

    pub fn items(&self) -> &[InvoiceItem] {
        &self.draft.items
    }

    pub fn taxes(&self) -> &Taxes {
        &self.draft.taxes
    }

    /// Clear everything back to an empty invoice
    pub fn reset(&mut self) {
        self.draft = InvoiceDraft::default();
    }

    pub fn set_company(&mut self, patch: PartyPatch) {
        self.draft.company.apply(patch);
    }

    pub fn set_client(&mut self, patch: PartyPatch) {
        self.draft.client.apply(patch);
    }

    pub fn set_invoice(&mut self, patch: InvoiceMetaPatch) {
        self.draft.invoice.apply(patch);
    }

    pub fn set_taxes(&mut self, patch: TaxesPatch) {
        self.draft.taxes.apply(patch);
    }

    pub fn set_watermark(&mut self, patch: WatermarkPatch) {
        if let Some(text) = patch.text {
            self.draft.watermark.text = text;
        }
        if let Some(enabled) = patch.enabled {
            self.draft.watermark.enabled = enabled;
        }
    }

    /// Fill empty company fields from the saved company record
    ///
    /// Fields the user already typed are left alone.
    pub fn prefill_company(&mut self, details: &CompanyDetails) {
        let company = &mut self.draft.company;
        for (field, value) in [
            (&mut company.name, &details.name),
            (&mut company.gst, &details.gst),
            (&mut company.address, &details.address),
            (&mut company.phone, &details.phone),
            (&mut company.email, &details.email),
        ] {
            if field.trim().is_empty() {
                if let Some(value) = value {
                    *field = value.clone();
                }
            }
        }
    }

    /// Append a blank line item and return its id
    pub fn add_item(&mut self) -> String {
        let item = InvoiceItem::blank();
        let id = item.id.clone();
        self.draft.items.push(item);
        id
    }

    /// Append a line filled from a catalog product and return its id
    pub fn add_product(
        &mut self,
        product_id: &str,
        qty: f64,
        products: &ProductRepository,
    ) -> GstBillResult<String> {
        let product = products
            .get(product_id)?
            .ok_or_else(|| GstBillError::product_not_found(product_id))?;

        let mut item = InvoiceItem::new(product.name, product.price, qty);
        item.product_id = Some(product.id);
        let id = item.id.clone();
        self.draft.items.push(item);
        Ok(id)
    }

    /// Remove a line item; returns whether it existed
    pub fn remove_item(&mut self, item_id: &str) -> bool {
        let before = self.draft.items.len();
        self.draft.items.retain(|item| item.id != item_id);
        self.draft.items.len() != before
    }

    pub fn set_item_qty(&mut self, item_id: &str, qty: f64) -> GstBillResult<()> {
        self.edit_item(item_id, |item| item.qty = qty)
    }

    pub fn set_item_rate(&mut self, item_id: &str, rate: Money) -> GstBillResult<()> {
        self.edit_item(item_id, |item| item.rate = rate)
    }

    pub fn set_item_name(&mut self, item_id: &str, name: impl Into<String>) -> GstBillResult<()> {
        let name = name.into();
        self.edit_item(item_id, |item| item.name = name)
    }

    pub fn set_item_hsn(&mut self, item_id: &str, hsn: Option<String>) -> GstBillResult<()> {
        self.edit_item(item_id, |item| item.hsn = hsn.filter(|h| !h.is_empty()))
    }

    /// Fill a line item from a catalog product
    ///
    /// Copies the product's name and price. If the product does not exist
    /// the item is left untouched and `NotFound` is returned.
    pub fn choose_product(
        &mut self,
        item_id: &str,
        product_id: &str,
        products: &ProductRepository,
    ) -> GstBillResult<()> {
        let index = self.item_index(item_id)?;
        let product = products
            .get(product_id)?
            .ok_or_else(|| GstBillError::product_not_found(product_id))?;

        let item = &mut self.draft.items[index];
        item.name = product.name;
        item.rate = product.price;
        item.product_id = Some(product.id);
        item.recompute();
        Ok(())
    }

    /// Current totals
    pub fn totals(&self) -> InvoiceTotals {
        InvoiceCalculator::calculate(&self.draft.items, &self.draft.taxes)
    }

    fn item_index(&self, item_id: &str) -> GstBillResult<usize> {
        self.draft
            .items
            .iter()
            .position(|item| item.id == item_id)
            .ok_or_else(|| GstBillError::item_not_found(item_id))
    }

    fn edit_item(
        &mut self,
        item_id: &str,
        edit: impl FnOnce(&mut InvoiceItem),
    ) -> GstBillResult<()> {
        let index = self.item_index(item_id)?;
        let item = &mut self.draft.items[index];
        edit(item);
        item.recompute();
        Ok(())
    }
}

fn default_taxes(settings: &Settings) -> Taxes {
    Taxes {
        cgst: settings.default_cgst,
        sgst: settings.default_sgst,
        igst: settings.default_igst,
        notes: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Product;
    use crate::storage::{KeyValueStore, MemoryKvStore, StaticSource};
    use serde_json::json;
    use std::sync::Arc;

    fn products() -> ProductRepository {
        let port: Arc<dyn KeyValueStore> = Arc::new(MemoryKvStore::new());
        let repo = ProductRepository::new(port);
        repo.load(&StaticSource {
            products: Some(json!([{"id": "tea", "name": "Masala Tea", "price": 120}])),
            ..Default::default()
        })
        .unwrap();
        repo
    }

    #[test]
    fn test_add_item_is_blank() {
        let mut session = InvoiceDraftSession::new();
        let id = session.add_item();

        let item = &session.items()[0];
        assert_eq!(item.id, id);
        assert!(item.name.is_empty());
        assert!(item.rate.is_zero());
        assert_eq!(item.qty, 1.0);
        assert!(item.amount.is_zero());
    }

    #[test]
    fn test_item_edits_recompute_amount() {
        let mut session = InvoiceDraftSession::new();
        let id = session.add_item();

        session.set_item_rate(&id, Money::from_rupees(40.0)).unwrap();
        assert_eq!(session.items()[0].amount, Money::from_rupees(40.0));

        session.set_item_qty(&id, 2.5).unwrap();
        assert_eq!(session.items()[0].amount, Money::from_rupees(100.0));

        session.set_item_name(&id, "Cardamom").unwrap();
        session.set_item_hsn(&id, Some("0908".into())).unwrap();
        assert_eq!(session.items()[0].hsn.as_deref(), Some("0908"));
        assert_eq!(session.items()[0].amount, Money::from_rupees(100.0));
    }

    #[test]
    fn test_edit_unknown_item() {
        let mut session = InvoiceDraftSession::new();
        let err = session.set_item_qty("missing", 1.0).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_choose_product_copies_name_and_price() {
        let products = products();
        let mut session = InvoiceDraftSession::new();
        let id = session.add_item();
        session.set_item_qty(&id, 2.0).unwrap();

        session.choose_product(&id, "tea", &products).unwrap();

        let item = &session.items()[0];
        assert_eq!(item.name, "Masala Tea");
        assert_eq!(item.rate, Money::from_rupees(120.0));
        assert_eq!(item.amount, Money::from_rupees(240.0));
        assert_eq!(item.product_id.as_deref(), Some("tea"));
    }

    #[test]
    fn test_choose_unknown_product_leaves_item_unchanged() {
        let products = products();
        let mut session = InvoiceDraftSession::new();
        let id = session.add_item();
        session.set_item_name(&id, "Custom").unwrap();
        let before = session.clone();

        let err = session.choose_product(&id, "nope", &products).unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(session, before);
    }

    #[test]
    fn test_choose_product_sees_overlay_edits() {
        let products = products();
        products
            .upsert(Product::with_id("tea", "Masala Tea", Money::from_rupees(130.0)))
            .unwrap();

        let mut session = InvoiceDraftSession::new();
        let id = session.add_product("tea", 1.0, &products).unwrap();
        assert_eq!(session.items()[0].id, id);
        assert_eq!(session.items()[0].amount, Money::from_rupees(130.0));
    }

    #[test]
    fn test_remove_item() {
        let mut session = InvoiceDraftSession::new();
        let first = session.add_item();
        let second = session.add_item();

        assert!(session.remove_item(&first));
        assert!(!session.remove_item(&first));
        assert_eq!(session.items().len(), 1);
        assert_eq!(session.items()[0].id, second);
    }

    #[test]
    fn test_totals_follow_items_and_taxes() {
        let products = products();
        let mut session = InvoiceDraftSession::new();
        session.add_product("tea", 1.0, &products).unwrap();
        session.set_taxes(TaxesPatch {
            igst: Some(Some(5.0)),
            ..Default::default()
        });

        let totals = session.totals();
        assert_eq!(totals.igst_amt, Money::from_rupees(6.0));
        assert_eq!(totals.grand_total, Money::from_rupees(126.0));
    }

    #[test]
    fn test_prefill_company_keeps_typed_fields() {
        let mut session = InvoiceDraftSession::new();
        session.set_company(PartyPatch {
            name: Some("Typed Name".into()),
            ..Default::default()
        });
        session.prefill_company(&CompanyDetails {
            name: Some("Saved Name".into()),
            gst: Some("29ABCDE1234F1Z5".into()),
            ..Default::default()
        });

        let company = &session.draft().company;
        assert_eq!(company.name, "Typed Name");
        assert_eq!(company.gst, "29ABCDE1234F1Z5");
    }

    #[test]
    fn test_from_settings_uses_default_rates() {
        let settings = Settings {
            default_cgst: Some(9.0),
            default_sgst: Some(9.0),
            ..Default::default()
        };
        let session = InvoiceDraftSession::from_settings(&settings);
        assert_eq!(session.taxes().cgst, Some(9.0));
        assert_eq!(session.taxes().igst, None);
    }

    #[test]
    fn test_reset_and_watermark() {
        let mut session = InvoiceDraftSession::new();
        session.add_item();
        session.set_watermark(WatermarkPatch {
            text: Some("PAID".into()),
            enabled: Some(true),
        });
        assert!(session.draft().watermark.is_visible());

        session.reset();
        assert_eq!(session, InvoiceDraftSession::new());
    }

    #[test]
    fn test_resume_recomputes_stored_amounts() {
        let dir = tempfile::TempDir::new().unwrap();
        let repo = DraftRepository::new(dir.path().join("draft.json"));

        let mut item = InvoiceItem::new("Masala Tea", Money::from_rupees(100.0), 2.0);
        item.amount = Money::from_rupees(999.0);
        let draft = InvoiceDraft {
            items: vec![item],
            ..Default::default()
        };
        repo.save(&draft).unwrap();

        let session = InvoiceDraftSession::resume(&repo, &Settings::default()).unwrap();
        assert_eq!(session.items()[0].amount, Money::from_rupees(200.0));
        assert_eq!(session.totals().taxable, Money::from_rupees(200.0));
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigationEntry {
    pub key: &'static str,
    pub targets: &'static [&'static str],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordKindEntry {
    pub key: &'static str,
    pub record_kind: &'static str,
}

pub struct EntityMapper;

// Scan order of the fallback keyword tier: longer keys precede their prefixes.
const NAVIGATION_TARGETS: [NavigationEntry; 30] = [
    NavigationEntry { key: "sales", targets: &["Sales", "sale"] },
    NavigationEntry { key: "sale", targets: &["Sales", "sale"] },
    NavigationEntry { key: "invoices", targets: &["Invoicing", "invoicing"] },
    NavigationEntry { key: "invoicing", targets: &["Invoicing", "invoicing"] },
    NavigationEntry { key: "customers", targets: &["Contacts", "contacts"] },
    NavigationEntry { key: "contacts", targets: &["Contacts", "contacts"] },
    NavigationEntry { key: "products", targets: &["Products", "product"] },
    NavigationEntry { key: "product", targets: &["Products", "product"] },
    NavigationEntry { key: "inventory", targets: &["Inventory", "inventory"] },
    NavigationEntry { key: "stock", targets: &["Inventory", "inventory"] },
    NavigationEntry { key: "purchases", targets: &["Purchase", "purchase"] },
    NavigationEntry { key: "purchase", targets: &["Purchase", "purchase"] },
    NavigationEntry { key: "employees", targets: &["Employees", "employee"] },
    NavigationEntry { key: "employee", targets: &["Employees", "employee"] },
    NavigationEntry { key: "settings", targets: &["Settings", "settings"] },
    NavigationEntry { key: "apps", targets: &["Apps", "apps"] },
    NavigationEntry { key: "modules", targets: &["Apps", "apps"] },
    NavigationEntry { key: "dashboard", targets: &["Dashboards", "dashboard"] },
    NavigationEntry { key: "dashboards", targets: &["Dashboards", "dashboard"] },
    NavigationEntry { key: "calendar", targets: &["Calendar", "calendar"] },
    NavigationEntry { key: "discuss", targets: &["Discuss", "discuss"] },
    NavigationEntry { key: "inbox", targets: &["Inbox", "inbox"] },
    NavigationEntry { key: "messages", targets: &["Inbox", "inbox"] },
    NavigationEntry { key: "crm", targets: &["CRM", "crm"] },
    NavigationEntry { key: "leads", targets: &["Leads", "leads"] },
    NavigationEntry { key: "opportunities", targets: &["Opportunities", "opportunities"] },
    NavigationEntry { key: "website", targets: &["Website", "website"] },
    NavigationEntry { key: "pos", targets: &["Point of Sale", "pos"] },
    NavigationEntry { key: "manufacturing", targets: &["Manufacturing", "manufacturing"] },
    NavigationEntry { key: "projects", targets: &["Projects", "projects"] },
];

const RECORD_KINDS: [RecordKindEntry; 39] = [
    RecordKindEntry { key: "sales", record_kind: "sale.order" },
    RecordKindEntry { key: "sale orders", record_kind: "sale.order" },
    RecordKindEntry { key: "sale order", record_kind: "sale.order" },
    RecordKindEntry { key: "orders", record_kind: "sale.order" },
    RecordKindEntry { key: "invoices", record_kind: "account.move" },
    RecordKindEntry { key: "invoice", record_kind: "account.move" },
    RecordKindEntry { key: "invoicing", record_kind: "account.move" },
    RecordKindEntry { key: "bills", record_kind: "account.move" },
    RecordKindEntry { key: "customers", record_kind: "res.partner" },
    RecordKindEntry { key: "customer", record_kind: "res.partner" },
    RecordKindEntry { key: "partners", record_kind: "res.partner" },
    RecordKindEntry { key: "partner", record_kind: "res.partner" },
    RecordKindEntry { key: "contacts", record_kind: "res.partner" },
    RecordKindEntry { key: "products", record_kind: "product.template" },
    RecordKindEntry { key: "product", record_kind: "product.template" },
    RecordKindEntry { key: "inventory", record_kind: "stock.quant" },
    RecordKindEntry { key: "stock", record_kind: "stock.quant" },
    RecordKindEntry { key: "purchases", record_kind: "purchase.order" },
    RecordKindEntry { key: "purchase orders", record_kind: "purchase.order" },
    RecordKindEntry { key: "purchase", record_kind: "purchase.order" },
    RecordKindEntry { key: "employees", record_kind: "hr.employee" },
    RecordKindEntry { key: "employee", record_kind: "hr.employee" },
    RecordKindEntry { key: "users", record_kind: "res.users" },
    RecordKindEntry { key: "user", record_kind: "res.users" },
    RecordKindEntry { key: "payments", record_kind: "account.payment" },
    RecordKindEntry { key: "payment", record_kind: "account.payment" },
    RecordKindEntry { key: "leads", record_kind: "crm.lead" },
    RecordKindEntry { key: "lead", record_kind: "crm.lead" },
    RecordKindEntry { key: "opportunities", record_kind: "crm.lead" },
    RecordKindEntry { key: "opportunity", record_kind: "crm.lead" },
    RecordKindEntry { key: "settings", record_kind: "res.config.settings" },
    RecordKindEntry { key: "configuration", record_kind: "res.config.settings" },
    RecordKindEntry { key: "apps", record_kind: "ir.module.module" },
    RecordKindEntry { key: "modules", record_kind: "ir.module.module" },
    RecordKindEntry { key: "dashboard", record_kind: "board.board" },
    RecordKindEntry { key: "dashboards", record_kind: "board.board" },
    RecordKindEntry { key: "inbox", record_kind: "mail.message" },
    RecordKindEntry { key: "discuss", record_kind: "mail.message" },
    RecordKindEntry { key: "messages", record_kind: "mail.message" },
];

fn normalize_key(entity: &str) -> String {
    entity.trim().to_lowercase()
}

impl EntityMapper {
    pub fn navigation_entries() -> &'static [NavigationEntry] {
        &NAVIGATION_TARGETS
    }

    pub fn record_kind_entries() -> &'static [RecordKindEntry] {
        &RECORD_KINDS
    }

    pub fn known_keys() -> impl Iterator<Item = &'static str> {
        NAVIGATION_TARGETS.iter().map(|entry| entry.key)
    }

    pub fn map_to_targets(entity: &str) -> Vec<String> {
        let key = normalize_key(entity);
        NAVIGATION_TARGETS
            .iter()
            .find(|entry| entry.key == key)
            .map(|entry| entry.targets.iter().map(|t| t.to_string()).collect())
            .unwrap_or_default()
    }

    pub fn map_to_record_kind(entity: &str) -> Option<&'static str> {
        let key = normalize_key(entity);
        RECORD_KINDS
            .iter()
            .find(|entry| entry.key == key)
            .map(|entry| entry.record_kind)
    }
}

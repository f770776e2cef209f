use serde::Serialize;

use super::{Catalog, PropertyDescriptor};

/// Ordered column lists handed to whatever builds statement text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnPlan {
    pub table: String,
    pub dynamic: bool,
    /// Every property, in catalog order.
    pub columns: Vec<String>,
    /// Columns bound on insert: the generated column and non-insertable
    /// columns are left out.
    pub insert_columns: Vec<String>,
    /// Columns assigned on update: primary key, generated column and
    /// non-updatable columns are left out.
    pub update_columns: Vec<String>,
    pub primary_key: Option<String>,
    pub generated_column: Option<String>,
}

impl ColumnPlan {
    /// Comma-separated column list for a select, `*` for dynamic rows.
    pub fn select_list(&self) -> String {
        if self.dynamic || self.columns.is_empty() {
            "*".to_string()
        } else {
            self.columns.join(",")
        }
    }

    pub fn insert_arg_count(&self) -> usize {
        self.insert_columns.len()
    }

    /// Update columns plus the primary key used to locate the row.
    pub fn update_arg_count(&self) -> usize {
        self.update_columns.len() + usize::from(self.primary_key.is_some())
    }
}

impl<T> Catalog<T> {
    pub fn column_plan(&self) -> ColumnPlan {
        let names = |keep: &dyn Fn(&PropertyDescriptor<T>) -> bool| {
            self.properties()
                .iter()
                .filter(|descriptor| keep(*descriptor))
                .map(|descriptor| descriptor.name().to_string())
                .collect::<Vec<_>>()
        };

        ColumnPlan {
            table: self.table().to_string(),
            dynamic: self.is_dynamic(),
            columns: names(&|_| true),
            insert_columns: names(&|descriptor| self.is_insert_column(descriptor)),
            update_columns: names(&|descriptor| self.is_update_column(descriptor)),
            primary_key: self.primary_key().map(str::to_string),
            generated_column: self.generated_column().map(str::to_string),
        }
    }

    pub(crate) fn is_insert_column(&self, descriptor: &PropertyDescriptor<T>) -> bool {
        self.generated_column() != Some(descriptor.name())
            && descriptor.column().is_none_or(|meta| meta.insertable)
    }

    pub(crate) fn is_update_column(&self, descriptor: &PropertyDescriptor<T>) -> bool {
        self.primary_key() != Some(descriptor.name())
            && self.generated_column() != Some(descriptor.name())
            && descriptor.column().is_none_or(|meta| meta.updatable)
    }
}

#[cfg(test)]
mod tests {
    use crate::catalog::{Catalog, ColumnMeta, Mapped, Mapping};

    #[derive(Default)]
    struct Account {
        id: i64,
        email: String,
        created: String,
        balance: f64,
    }

    impl Mapped for Account {
        fn map(m: &mut Mapping<Self>) {
            m.table("accounts");
            m.field("id", |a: &Account| &a.id, |a: &mut Account| &mut a.id)
                .id()
                .generated();
            m.field("email", |a: &Account| &a.email, |a: &mut Account| &mut a.email)
                .column_meta(ColumnMeta::named("email_address").unique());
            m.field("created", |a: &Account| &a.created, |a: &mut Account| &mut a.created)
                .column_meta(ColumnMeta::default().updatable(false));
            m.field("balance", |a: &Account| &a.balance, |a: &mut Account| &mut a.balance);
        }
    }

    #[test]
    fn test_column_plan() {
        let plan = Catalog::<Account>::build().unwrap().column_plan();

        assert_eq!(plan.table, "accounts");
        assert_eq!(plan.columns, ["id", "email_address", "created", "balance"]);
        assert_eq!(plan.insert_columns, ["email_address", "created", "balance"]);
        assert_eq!(plan.update_columns, ["email_address", "balance"]);
        assert_eq!(plan.primary_key.as_deref(), Some("id"));
        assert_eq!(plan.select_list(), "id,email_address,created,balance");
        assert_eq!(plan.insert_arg_count(), 3);
        assert_eq!(plan.update_arg_count(), 3);
    }
}

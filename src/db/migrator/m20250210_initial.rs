use crate::entities::prelude::*;
use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::Schema;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Bootstrap superadmin credentials. The password must be rotated after the
/// first login; tests rely on this literal.
const DEFAULT_SUPERADMIN_EMAIL: &str = "superadmin@beredt.no";
const DEFAULT_SUPERADMIN_PASSWORD: &[u8] = b"password";

/// Hash the bootstrap password using Argon2id
fn hash_default_password() -> String {
    use argon2::{
        Argon2,
        password_hash::{PasswordHasher, SaltString, rand_core::OsRng},
    };

    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(DEFAULT_SUPERADMIN_PASSWORD, &salt)
        .expect("Failed to hash default password")
        .to_string()
}

/// (name_no, name_en, kcal_per_unit, is_essential)
const CATEGORY_SEED: &[(&str, &str, Option<f64>, bool)] = &[
    ("Vann", "Water", None, false),
    ("Hermetikk", "Canned food", Some(400.0), false),
    ("Tørrmat", "Dry food", Some(350.0), false),
    ("Knekkebrød", "Crispbread", Some(380.0), false),
    ("Førstehjelp", "First aid", None, true),
    ("Gassbrenner", "Camping stove", None, true),
    ("Lommelykt", "Flashlight", None, true),
    ("Stearinlys", "Candles", None, true),
    ("Fyrstikker", "Matches", None, true),
    ("Batterier", "Batteries", None, true),
    ("DAB-radio", "DAB radio", None, true),
    ("Jodtabletter", "Iodine tablets", None, true),
    ("Varme klær", "Warm clothing", None, false),
    ("Sengetøy", "Bedding", None, false),
];

/// (name_no, name_en)
const UNIT_SEED: &[(&str, &str)] = &[
    ("l", "Liter"),
    ("stk", "Stykk"),
    ("kg", "Kilogram"),
    ("g", "Gram"),
    ("pk", "Pakke"),
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let backend = manager.get_database_backend();
        let schema = Schema::new(backend);

        manager
            .create_table(
                schema
                    .create_table_from_entity(Users)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(Households)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(HouseholdMembers)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(HouseholdJoinCodes)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(Units)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(Categories)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(Items)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(HouseholdItems)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        let now = chrono::Utc::now().to_rfc3339();

        let mut unit_insert = sea_orm_migration::sea_query::Query::insert()
            .into_table(Units)
            .columns([
                crate::entities::units::Column::NameNo,
                crate::entities::units::Column::NameEn,
            ])
            .to_owned();
        for (name_no, name_en) in UNIT_SEED {
            unit_insert.values_panic([(*name_no).into(), (*name_en).into()]);
        }
        manager.exec_stmt(unit_insert).await?;

        let mut category_insert = sea_orm_migration::sea_query::Query::insert()
            .into_table(Categories)
            .columns([
                crate::entities::categories::Column::NameNo,
                crate::entities::categories::Column::NameEn,
                crate::entities::categories::Column::KcalPerUnit,
                crate::entities::categories::Column::IsEssential,
            ])
            .to_owned();
        for (name_no, name_en, kcal, essential) in CATEGORY_SEED {
            category_insert.values_panic([
                (*name_no).into(),
                (*name_en).into(),
                (*kcal).into(),
                (*essential).into(),
            ]);
        }
        manager.exec_stmt(category_insert).await?;

        let password_hash = hash_default_password();
        let superadmin_insert = sea_orm_migration::sea_query::Query::insert()
            .into_table(Users)
            .columns([
                crate::entities::users::Column::Email,
                crate::entities::users::Column::PasswordHash,
                crate::entities::users::Column::FirstName,
                crate::entities::users::Column::LastName,
                crate::entities::users::Column::Phone,
                crate::entities::users::Column::Role,
                crate::entities::users::Column::EmailVerified,
                crate::entities::users::Column::CreatedAt,
                crate::entities::users::Column::UpdatedAt,
            ])
            .values_panic([
                DEFAULT_SUPERADMIN_EMAIL.into(),
                password_hash.into(),
                "Super".into(),
                "Admin".into(),
                "+4700000000".into(),
                "superadmin".into(),
                true.into(),
                now.clone().into(),
                now.into(),
            ])
            .to_owned();
        manager.exec_stmt(superadmin_insert).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(HouseholdItems).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Items).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Categories).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Units).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(HouseholdJoinCodes).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(HouseholdMembers).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Households).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users).to_owned())
            .await?;

        Ok(())
    }
}

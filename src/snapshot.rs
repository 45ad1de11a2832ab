//! A consistent in-memory copy of the four relations.
//!
//! Reports and summary metrics are computed from a [`Snapshot`] so they never
//! talk to the storage engine and never see a half-applied write.

use std::collections::HashMap;

use sea_orm::{ConnectionTrait, DbErr, EntityTrait, QueryOrder};
use serde::Serialize;

use crate::entity::{claim, food_listing, provider, receiver};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    pub providers: Vec<provider::Model>,
    pub receivers: Vec<receiver::Model>,
    pub food_listings: Vec<food_listing::Model>,
    pub claims: Vec<claim::Model>,
}

impl Snapshot {
    /// Reads every table ordered by primary key. Pass a transaction to get a
    /// consistent view.
    pub async fn read<C>(db: &C) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let providers = provider::Entity::find()
            .order_by_asc(provider::Column::ProviderId)
            .all(db)
            .await?;
        let receivers = receiver::Entity::find()
            .order_by_asc(receiver::Column::ReceiverId)
            .all(db)
            .await?;
        let food_listings = food_listing::Entity::find()
            .order_by_asc(food_listing::Column::FoodId)
            .all(db)
            .await?;
        let claims = claim::Entity::find()
            .order_by_asc(claim::Column::ClaimId)
            .all(db)
            .await?;

        Ok(Self {
            providers,
            receivers,
            food_listings,
            claims,
        })
    }

    pub fn providers_by_id(&self) -> HashMap<i32, &provider::Model> {
        self.providers.iter().map(|p| (p.provider_id, p)).collect()
    }

    pub fn listings_by_id(&self) -> HashMap<i32, &food_listing::Model> {
        self.food_listings.iter().map(|l| (l.food_id, l)).collect()
    }

    /// Claims grouped under the listing they target.
    pub fn claims_by_listing(&self) -> HashMap<i32, Vec<&claim::Model>> {
        let mut map: HashMap<i32, Vec<&claim::Model>> = HashMap::new();
        for claim in &self.claims {
            map.entry(claim.food_id).or_default().push(claim);
        }
        map
    }

    pub fn total_quantity(&self) -> i64 {
        self.food_listings.iter().map(|l| i64::from(l.quantity)).sum()
    }
}

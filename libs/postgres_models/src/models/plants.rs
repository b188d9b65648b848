use bigdecimal::BigDecimal;
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};

#[derive(Queryable, Selectable, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::plants)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Plant {
    pub id: i32,
    pub name: String,
    pub image: String,
    pub price: BigDecimal,
    pub is_in_stock: bool,
}

#[derive(Insertable, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::plants)]
pub struct NewPlant {
    pub name: String,
    pub image: String,
    pub price: BigDecimal,
    pub is_in_stock: bool,
}

impl Plant {
    pub async fn create(
        entry: NewPlant,
        conn: &mut AsyncPgConnection,
    ) -> Result<Self, diesel::result::Error> {
        use crate::schema::plants::dsl::*;

        diesel::insert_into(plants)
            .values(&entry)
            .returning(Plant::as_returning())
            .get_result(conn)
            .await
    }

    /// All plants ordered by id.
    pub async fn find_all(
        conn: &mut AsyncPgConnection,
    ) -> Result<Vec<Self>, diesel::result::Error> {
        use crate::schema::plants::dsl::*;

        plants
            .order(id.asc())
            .select(Plant::as_select())
            .load(conn)
            .await
    }

    pub async fn find_by_id(
        plant_id: i32,
        conn: &mut AsyncPgConnection,
    ) -> Result<Option<Self>, diesel::result::Error> {
        use crate::schema::plants::dsl::*;

        plants
            .find(plant_id)
            .select(Plant::as_select())
            .first(conn)
            .await
            .optional()
    }

    /// Same as [`Plant::find_by_id`] but takes a row lock, so it must run
    /// inside a transaction.
    pub async fn find_by_id_for_update(
        plant_id: i32,
        conn: &mut AsyncPgConnection,
    ) -> Result<Option<Self>, diesel::result::Error> {
        use crate::schema::plants::dsl::*;

        plants
            .find(plant_id)
            .select(Plant::as_select())
            .for_update()
            .get_result(conn)
            .await
            .optional()
    }

    /// Write every mutable column of `self` back to its row.
    pub async fn save(
        &self,
        conn: &mut AsyncPgConnection,
    ) -> Result<Self, diesel::result::Error> {
        use crate::schema::plants::dsl::*;

        diesel::update(plants.find(self.id))
            .set((
                name.eq(&self.name),
                image.eq(&self.image),
                price.eq(&self.price),
                is_in_stock.eq(self.is_in_stock),
            ))
            .returning(Plant::as_returning())
            .get_result(conn)
            .await
    }

    /// Returns the number of deleted rows (0 or 1).
    pub async fn delete(
        plant_id: i32,
        conn: &mut AsyncPgConnection,
    ) -> Result<usize, diesel::result::Error> {
        use crate::schema::plants::dsl::*;

        diesel::delete(plants.find(plant_id)).execute(conn).await
    }
}

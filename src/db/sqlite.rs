// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! SQLite store with typed, owner-scoped operations.
//!
//! Provides high-level operations for:
//! - Users (accounts and credentials)
//! - Travel plans (owned by one user)
//! - Activities and expenses (owned through their plan)
//!
//! Every plan, activity and expense operation resolves the parent plan
//! through [`owned_plan`] first. A plan owned by someone else is reported
//! exactly like a missing one.

use crate::db::rows::{convert_all, ActivityRow, ExpenseRow, PlanRow, UserRow};
use crate::db::Lookup;
use crate::error::AppError;
use crate::models::{
    Activity, ActivityPatch, Expense, ExpensePatch, NewActivity, NewExpense, NewPlan, PlanPatch,
    TravelPlan, User,
};
use crate::models::plan::REVERSED_DATES;
use crate::time_utils::{format_date, format_timestamp, now};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Executor, QueryBuilder, Sqlite, SqlitePool, Transaction};
use std::str::FromStr;
use std::time::Duration;
use uuid::Uuid;

const PLAN_COLUMNS: &str = "id, user_id, destination, budget, duration, interests, start_date, \
     end_date, itinerary, total_cost, created_at, updated_at";
const ACTIVITY_COLUMNS: &str =
    "id, plan_id, name, description, location, cost, duration, category, day, time_slot";
const EXPENSE_COLUMNS: &str = "id, plan_id, category, amount, description, date, created_at";

/// Counts of child rows removed along with a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanDeletion {
    pub activities: u64,
    pub expenses: u64,
}

/// How long a writer waits for the database lock before giving up.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// SQLite database handle.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open a connection pool. Foreign keys are enforced on every connection.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, AppError> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(BUSY_TIMEOUT);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections.max(1))
            // An in-memory database lives only as long as its connection.
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        tracing::info!(max_connections, "Connected to SQLite");

        Ok(Self { pool })
    }

    /// Fresh, migrated in-memory database for tests.
    pub async fn in_memory() -> Result<Self, AppError> {
        let db = Self::connect("sqlite::memory:", 1).await?;
        db.migrate().await?;
        Ok(db)
    }

    /// Apply pending schema migrations.
    pub async fn migrate(&self) -> Result<(), AppError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    /// Round-trip a trivial query; used by the health check.
    pub async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Start a transaction that takes the write lock immediately.
    ///
    /// Every write transaction reads the owning plan before writing. A
    /// deferred transaction would hold a read lock at that point, and two
    /// of them upgrading at once fail with `SQLITE_BUSY` without waiting.
    async fn begin_write(&self) -> Result<Transaction<'static, Sqlite>, AppError> {
        Ok(self.pool.begin_with("BEGIN IMMEDIATE").await?)
    }

    // ─── User Operations ─────────────────────────────────────────

    /// Insert a new user. A duplicate email is `EmailTaken` and writes nothing.
    pub async fn insert_user(&self, user: &User) -> Result<(), AppError> {
        let result = sqlx::query(
            "INSERT INTO users (id, email, name, password_hash, created_at) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&user.id)
        .bind(&user.email)
        .bind(&user.name)
        .bind(&user.password_hash)
        .bind(format_timestamp(user.created_at))
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(AppError::EmailTaken),
            Err(e) => Err(e.into()),
        }
    }

    /// Get a user by id.
    pub async fn get_user(&self, user_id: &str) -> Result<Lookup<User>, AppError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, email, name, password_hash, created_at FROM users WHERE id = ?",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::try_from).transpose().map(Lookup::from)
    }

    /// Get a user by their (already normalized) email.
    pub async fn get_user_by_email(&self, email: &str) -> Result<Lookup<User>, AppError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, email, name, password_hash, created_at FROM users WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::try_from).transpose().map(Lookup::from)
    }

    // ─── Travel Plan Operations ──────────────────────────────────

    /// Create a plan with an empty itinerary and zero total cost.
    pub async fn create_plan(&self, owner: &str, new: NewPlan) -> Result<TravelPlan, AppError> {
        let created_at = now();
        let plan = TravelPlan {
            id: Uuid::new_v4().to_string(),
            user_id: owner.to_string(),
            destination: new.destination,
            budget: new.budget,
            duration: new.duration,
            interests: new.interests,
            start_date: new.start_date,
            end_date: new.end_date,
            itinerary: serde_json::json!({}),
            total_cost: 0.0,
            created_at,
            updated_at: created_at,
        };

        sqlx::query(
            "INSERT INTO travel_plans (id, user_id, destination, budget, duration, interests, \
             start_date, end_date, itinerary, total_cost, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&plan.id)
        .bind(&plan.user_id)
        .bind(&plan.destination)
        .bind(plan.budget)
        .bind(plan.duration)
        .bind(serde_json::to_string(&plan.interests)?)
        .bind(format_date(plan.start_date))
        .bind(format_date(plan.end_date))
        .bind(serde_json::to_string(&plan.itinerary)?)
        .bind(plan.total_cost)
        .bind(format_timestamp(plan.created_at))
        .bind(format_timestamp(plan.updated_at))
        .execute(&self.pool)
        .await?;

        tracing::info!(user_id = %owner, plan_id = %plan.id, "Created travel plan");
        Ok(plan)
    }

    /// All plans of `owner`, newest first.
    pub async fn list_plans(&self, owner: &str) -> Result<Vec<TravelPlan>, AppError> {
        let sql = format!(
            "SELECT {} FROM travel_plans WHERE user_id = ? ORDER BY created_at DESC, rowid DESC",
            PLAN_COLUMNS
        );
        let rows = sqlx::query_as::<_, PlanRow>(&sql)
            .bind(owner)
            .fetch_all(&self.pool)
            .await?;

        convert_all(rows)
    }

    pub async fn get_plan(&self, owner: &str, plan_id: &str) -> Result<Lookup<TravelPlan>, AppError> {
        owned_plan(&self.pool, owner, plan_id).await
    }

    /// Apply `patch` to a plan. All present fields and `updated_at` change
    /// in one statement; an empty patch changes nothing.
    pub async fn update_plan(
        &self,
        owner: &str,
        plan_id: &str,
        patch: PlanPatch,
    ) -> Result<Lookup<TravelPlan>, AppError> {
        let mut tx = self.begin_write().await?;

        let current = match owned_plan(&mut *tx, owner, plan_id).await? {
            Lookup::Found(plan) => plan,
            Lookup::NotFound => return Ok(Lookup::NotFound),
        };
        let start_date = patch.start_date.unwrap_or(current.start_date);
        let end_date = patch.end_date.unwrap_or(current.end_date);
        if end_date < start_date {
            return Err(AppError::BadRequest(REVERSED_DATES.to_string()));
        }
        if patch.is_empty() {
            return Ok(Lookup::Found(current));
        }

        let mut builder = QueryBuilder::<Sqlite>::new("UPDATE travel_plans SET ");
        let mut set = builder.separated(", ");
        set.push("updated_at = ")
            .push_bind_unseparated(format_timestamp(now()));
        if let Some(destination) = patch.destination {
            set.push("destination = ").push_bind_unseparated(destination);
        }
        if let Some(budget) = patch.budget {
            set.push("budget = ").push_bind_unseparated(budget);
        }
        if let Some(duration) = patch.duration {
            set.push("duration = ").push_bind_unseparated(duration);
        }
        if let Some(interests) = patch.interests {
            set.push("interests = ")
                .push_bind_unseparated(serde_json::to_string(&interests)?);
        }
        if let Some(start_date) = patch.start_date {
            set.push("start_date = ")
                .push_bind_unseparated(format_date(start_date));
        }
        if let Some(end_date) = patch.end_date {
            set.push("end_date = ").push_bind_unseparated(format_date(end_date));
        }
        if let Some(itinerary) = patch.itinerary {
            set.push("itinerary = ")
                .push_bind_unseparated(serde_json::to_string(&itinerary)?);
        }
        if let Some(total_cost) = patch.total_cost {
            set.push("total_cost = ").push_bind_unseparated(total_cost);
        }
        builder
            .push(" WHERE id = ")
            .push_bind(plan_id)
            .push(" AND user_id = ")
            .push_bind(owner);

        builder.build().execute(&mut *tx).await?;
        let updated = owned_plan(&mut *tx, owner, plan_id).await?;
        tx.commit().await?;

        tracing::info!(user_id = %owner, plan_id = %plan_id, "Updated travel plan");
        Ok(updated)
    }

    /// Delete a plan together with its activities and expenses, atomically.
    pub async fn delete_plan(
        &self,
        owner: &str,
        plan_id: &str,
    ) -> Result<Lookup<PlanDeletion>, AppError> {
        let mut tx = self.begin_write().await?;

        if let Lookup::NotFound = owned_plan(&mut *tx, owner, plan_id).await? {
            return Ok(Lookup::NotFound);
        }

        let activities = sqlx::query("DELETE FROM activities WHERE plan_id = ?")
            .bind(plan_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        let expenses = sqlx::query("DELETE FROM expenses WHERE plan_id = ?")
            .bind(plan_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        let plans = sqlx::query("DELETE FROM travel_plans WHERE id = ? AND user_id = ?")
            .bind(plan_id)
            .bind(owner)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if plans == 0 {
            // Dropping the transaction rolls back the child deletes.
            return Ok(Lookup::NotFound);
        }
        tx.commit().await?;

        tracing::info!(
            user_id = %owner,
            plan_id = %plan_id,
            activities,
            expenses,
            "Deleted travel plan"
        );
        Ok(Lookup::Found(PlanDeletion {
            activities,
            expenses,
        }))
    }

    // ─── Activity Operations ─────────────────────────────────────

    /// Add an activity to a plan owned by `owner`.
    pub async fn create_activity(
        &self,
        owner: &str,
        new: NewActivity,
    ) -> Result<Lookup<Activity>, AppError> {
        let mut tx = self.begin_write().await?;

        if let Lookup::NotFound = owned_plan(&mut *tx, owner, &new.plan_id).await? {
            return Ok(Lookup::NotFound);
        }

        let activity = Activity {
            id: Uuid::new_v4().to_string(),
            plan_id: new.plan_id,
            name: new.name,
            description: new.description,
            location: new.location,
            cost: new.cost,
            duration: new.duration,
            category: new.category,
            day: new.day,
            time_slot: new.time_slot,
        };

        let location = activity
            .location
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        let sql = format!(
            "INSERT INTO activities ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            ACTIVITY_COLUMNS
        );
        sqlx::query(&sql)
            .bind(&activity.id)
            .bind(&activity.plan_id)
            .bind(&activity.name)
            .bind(&activity.description)
            .bind(location)
            .bind(activity.cost)
            .bind(activity.duration)
            .bind(activity.category.as_str())
            .bind(activity.day)
            .bind(&activity.time_slot)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        tracing::debug!(plan_id = %activity.plan_id, activity_id = %activity.id, "Created activity");
        Ok(Lookup::Found(activity))
    }

    /// Activities of a plan, ordered by day and then time slot.
    pub async fn list_activities(
        &self,
        owner: &str,
        plan_id: &str,
    ) -> Result<Lookup<Vec<Activity>>, AppError> {
        let mut conn = self.pool.acquire().await?;

        if let Lookup::NotFound = owned_plan(&mut *conn, owner, plan_id).await? {
            return Ok(Lookup::NotFound);
        }

        let sql = format!(
            "SELECT {} FROM activities WHERE plan_id = ? ORDER BY day ASC, time_slot ASC, rowid ASC",
            ACTIVITY_COLUMNS
        );
        let rows = sqlx::query_as::<_, ActivityRow>(&sql)
            .bind(plan_id)
            .fetch_all(&mut *conn)
            .await?;

        convert_all(rows).map(Lookup::Found)
    }

    /// Apply `patch` to an activity whose plan is owned by `owner`.
    pub async fn update_activity(
        &self,
        owner: &str,
        activity_id: &str,
        patch: ActivityPatch,
    ) -> Result<Lookup<Activity>, AppError> {
        let mut tx = self.begin_write().await?;

        let sql = format!("SELECT {} FROM activities WHERE id = ?", ACTIVITY_COLUMNS);
        let Some(row) = sqlx::query_as::<_, ActivityRow>(&sql)
            .bind(activity_id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(Lookup::NotFound);
        };
        if let Lookup::NotFound = owned_plan(&mut *tx, owner, &row.plan_id).await? {
            return Ok(Lookup::NotFound);
        }
        if patch.is_empty() {
            return Activity::try_from(row).map(Lookup::Found);
        }

        let mut builder = QueryBuilder::<Sqlite>::new("UPDATE activities SET ");
        let mut set = builder.separated(", ");
        if let Some(name) = patch.name {
            set.push("name = ").push_bind_unseparated(name);
        }
        if let Some(description) = patch.description {
            set.push("description = ").push_bind_unseparated(description);
        }
        if let Some(location) = patch.location {
            set.push("location = ")
                .push_bind_unseparated(serde_json::to_string(&location)?);
        }
        if let Some(cost) = patch.cost {
            set.push("cost = ").push_bind_unseparated(cost);
        }
        if let Some(duration) = patch.duration {
            set.push("duration = ").push_bind_unseparated(duration);
        }
        if let Some(category) = patch.category {
            set.push("category = ").push_bind_unseparated(category.as_str());
        }
        if let Some(day) = patch.day {
            set.push("day = ").push_bind_unseparated(day);
        }
        if let Some(time_slot) = patch.time_slot {
            set.push("time_slot = ").push_bind_unseparated(time_slot);
        }
        builder.push(" WHERE id = ").push_bind(activity_id);
        builder.build().execute(&mut *tx).await?;

        let row = sqlx::query_as::<_, ActivityRow>(&sql)
            .bind(activity_id)
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;

        Activity::try_from(row).map(Lookup::Found)
    }

    /// Remove an activity whose plan is owned by `owner`.
    pub async fn delete_activity(&self, owner: &str, activity_id: &str) -> Result<Lookup<()>, AppError> {
        let mut tx = self.begin_write().await?;

        let Some(plan_id) =
            sqlx::query_scalar::<_, String>("SELECT plan_id FROM activities WHERE id = ?")
                .bind(activity_id)
                .fetch_optional(&mut *tx)
                .await?
        else {
            return Ok(Lookup::NotFound);
        };
        if let Lookup::NotFound = owned_plan(&mut *tx, owner, &plan_id).await? {
            return Ok(Lookup::NotFound);
        }

        sqlx::query("DELETE FROM activities WHERE id = ?")
            .bind(activity_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(Lookup::Found(()))
    }

    // ─── Expense Operations ──────────────────────────────────────

    /// Record an expense against a plan owned by `owner`.
    pub async fn create_expense(
        &self,
        owner: &str,
        new: NewExpense,
    ) -> Result<Lookup<Expense>, AppError> {
        let mut tx = self.begin_write().await?;

        if let Lookup::NotFound = owned_plan(&mut *tx, owner, &new.plan_id).await? {
            return Ok(Lookup::NotFound);
        }

        let expense = Expense {
            id: Uuid::new_v4().to_string(),
            plan_id: new.plan_id,
            category: new.category,
            amount: new.amount,
            description: new.description,
            date: new.date,
            created_at: now(),
        };

        let sql = format!(
            "INSERT INTO expenses ({}) VALUES (?, ?, ?, ?, ?, ?, ?)",
            EXPENSE_COLUMNS
        );
        sqlx::query(&sql)
            .bind(&expense.id)
            .bind(&expense.plan_id)
            .bind(&expense.category)
            .bind(expense.amount)
            .bind(&expense.description)
            .bind(format_date(expense.date))
            .bind(format_timestamp(expense.created_at))
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        tracing::debug!(plan_id = %expense.plan_id, expense_id = %expense.id, "Recorded expense");
        Ok(Lookup::Found(expense))
    }

    /// Expenses of a plan, most recent date first.
    pub async fn list_expenses(
        &self,
        owner: &str,
        plan_id: &str,
    ) -> Result<Lookup<Vec<Expense>>, AppError> {
        let mut conn = self.pool.acquire().await?;

        if let Lookup::NotFound = owned_plan(&mut *conn, owner, plan_id).await? {
            return Ok(Lookup::NotFound);
        }

        let sql = format!(
            "SELECT {} FROM expenses WHERE plan_id = ? \
             ORDER BY date DESC, created_at DESC, rowid DESC",
            EXPENSE_COLUMNS
        );
        let rows = sqlx::query_as::<_, ExpenseRow>(&sql)
            .bind(plan_id)
            .fetch_all(&mut *conn)
            .await?;

        convert_all(rows).map(Lookup::Found)
    }

    /// Apply `patch` to an expense whose plan is owned by `owner`.
    pub async fn update_expense(
        &self,
        owner: &str,
        expense_id: &str,
        patch: ExpensePatch,
    ) -> Result<Lookup<Expense>, AppError> {
        let mut tx = self.begin_write().await?;

        let sql = format!("SELECT {} FROM expenses WHERE id = ?", EXPENSE_COLUMNS);
        let Some(row) = sqlx::query_as::<_, ExpenseRow>(&sql)
            .bind(expense_id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(Lookup::NotFound);
        };
        if let Lookup::NotFound = owned_plan(&mut *tx, owner, &row.plan_id).await? {
            return Ok(Lookup::NotFound);
        }
        if patch.is_empty() {
            return Expense::try_from(row).map(Lookup::Found);
        }

        let mut builder = QueryBuilder::<Sqlite>::new("UPDATE expenses SET ");
        let mut set = builder.separated(", ");
        if let Some(category) = patch.category {
            set.push("category = ").push_bind_unseparated(category);
        }
        if let Some(amount) = patch.amount {
            set.push("amount = ").push_bind_unseparated(amount);
        }
        if let Some(description) = patch.description {
            set.push("description = ").push_bind_unseparated(description);
        }
        if let Some(date) = patch.date {
            set.push("date = ").push_bind_unseparated(format_date(date));
        }
        builder.push(" WHERE id = ").push_bind(expense_id);
        builder.build().execute(&mut *tx).await?;

        let row = sqlx::query_as::<_, ExpenseRow>(&sql)
            .bind(expense_id)
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;

        Expense::try_from(row).map(Lookup::Found)
    }

    /// Remove an expense whose plan is owned by `owner`.
    pub async fn delete_expense(&self, owner: &str, expense_id: &str) -> Result<Lookup<()>, AppError> {
        let mut tx = self.begin_write().await?;

        let Some(plan_id) =
            sqlx::query_scalar::<_, String>("SELECT plan_id FROM expenses WHERE id = ?")
                .bind(expense_id)
                .fetch_optional(&mut *tx)
                .await?
        else {
            return Ok(Lookup::NotFound);
        };
        if let Lookup::NotFound = owned_plan(&mut *tx, owner, &plan_id).await? {
            return Ok(Lookup::NotFound);
        }

        sqlx::query("DELETE FROM expenses WHERE id = ?")
            .bind(expense_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(Lookup::Found(()))
    }
}

/// The single owner-scoped plan lookup. A plan that exists but belongs to
/// someone else is `NotFound`.
async fn owned_plan<'e, E>(
    executor: E,
    owner: &str,
    plan_id: &str,
) -> Result<Lookup<TravelPlan>, AppError>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!(
        "SELECT {} FROM travel_plans WHERE id = ? AND user_id = ?",
        PLAN_COLUMNS
    );
    let row = sqlx::query_as::<_, PlanRow>(&sql)
        .bind(plan_id)
        .bind(owner)
        .fetch_optional(executor)
        .await?;

    row.map(TravelPlan::try_from).transpose().map(Lookup::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ActivityCategory;
    use chrono::NaiveDate;

    async fn db_with_users() -> Database {
        let db = Database::in_memory().await.unwrap();
        add_users(&db).await;
        db
    }

    async fn add_users(db: &Database) {
        for id in ["alice", "bob"] {
            db.insert_user(&User {
                id: id.to_string(),
                email: format!("{}@example.com", id),
                name: id.to_string(),
                password_hash: "x".to_string(),
                created_at: now(),
            })
            .await
            .unwrap();
        }
    }

    fn new_plan(destination: &str) -> NewPlan {
        NewPlan {
            destination: destination.to_string(),
            budget: 2000.0,
            duration: 5,
            interests: vec!["art".to_string()],
            start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 1, 6).unwrap(),
        }
    }

    fn new_activity(plan_id: &str, name: &str, day: u32, time_slot: &str) -> NewActivity {
        NewActivity {
            plan_id: plan_id.to_string(),
            name: name.to_string(),
            description: String::new(),
            location: None,
            cost: 10.0,
            duration: 1,
            category: ActivityCategory::Other,
            day,
            time_slot: time_slot.to_string(),
        }
    }

    fn new_expense(plan_id: &str, day: u32) -> NewExpense {
        NewExpense {
            plan_id: plan_id.to_string(),
            category: "food".to_string(),
            amount: 12.5,
            description: format!("day {}", day),
            date: NaiveDate::from_ymd_opt(2025, 1, day).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_duplicate_email_writes_nothing() {
        let db = db_with_users().await;
        let dup = User {
            id: "carol".to_string(),
            email: "alice@example.com".to_string(),
            name: "Carol".to_string(),
            password_hash: "x".to_string(),
            created_at: now(),
        };

        assert!(matches!(db.insert_user(&dup).await, Err(AppError::EmailTaken)));
        assert!(matches!(db.get_user("carol").await.unwrap(), Lookup::NotFound));
    }

    #[tokio::test]
    async fn test_new_plan_defaults() {
        let db = db_with_users().await;
        let plan = db.create_plan("alice", new_plan("Paris")).await.unwrap();

        assert_eq!(plan.itinerary, serde_json::json!({}));
        assert_eq!(plan.total_cost, 0.0);
        assert_eq!(plan.created_at, plan.updated_at);

        let stored = db.get_plan("alice", &plan.id).await.unwrap().into_option().unwrap();
        assert_eq!(stored, plan);
    }

    #[tokio::test]
    async fn test_plans_are_owner_scoped() {
        let db = db_with_users().await;
        let plan = db.create_plan("alice", new_plan("Paris")).await.unwrap();

        assert!(matches!(db.get_plan("bob", &plan.id).await.unwrap(), Lookup::NotFound));
        assert!(db.list_plans("bob").await.unwrap().is_empty());

        let patch = PlanPatch {
            destination: Some("Rome".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            db.update_plan("bob", &plan.id, patch).await.unwrap(),
            Lookup::NotFound
        ));
        assert!(matches!(db.delete_plan("bob", &plan.id).await.unwrap(), Lookup::NotFound));

        let stored = db.get_plan("alice", &plan.id).await.unwrap().into_option().unwrap();
        assert_eq!(stored, plan);
    }

    #[tokio::test]
    async fn test_list_plans_newest_first() {
        let db = db_with_users().await;
        let first = db.create_plan("alice", new_plan("Paris")).await.unwrap();
        let second = db.create_plan("alice", new_plan("Rome")).await.unwrap();

        let plans = db.list_plans("alice").await.unwrap();
        let ids: Vec<_> = plans.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec![second.id.as_str(), first.id.as_str()]);
    }

    #[tokio::test]
    async fn test_empty_patch_keeps_updated_at() {
        let db = db_with_users().await;
        let plan = db.create_plan("alice", new_plan("Paris")).await.unwrap();

        let unchanged = db
            .update_plan("alice", &plan.id, PlanPatch::default())
            .await
            .unwrap()
            .into_option()
            .unwrap();
        assert_eq!(unchanged, plan);
    }

    #[tokio::test]
    async fn test_patch_applies_fields_together() {
        let db = db_with_users().await;
        let plan = db.create_plan("alice", new_plan("Paris")).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;

        let patch = PlanPatch {
            budget: Some(1500.0),
            interests: Some(vec!["food".to_string(), "wine".to_string()]),
            itinerary: Some(serde_json::json!({"days": []})),
            ..Default::default()
        };
        let updated = db
            .update_plan("alice", &plan.id, patch)
            .await
            .unwrap()
            .into_option()
            .unwrap();

        assert_eq!(updated.budget, 1500.0);
        assert_eq!(updated.interests, vec!["food", "wine"]);
        assert_eq!(updated.itinerary, serde_json::json!({"days": []}));
        assert_eq!(updated.destination, "Paris");
        assert_eq!(updated.created_at, plan.created_at);
        assert!(updated.updated_at > plan.updated_at);
    }

    #[tokio::test]
    async fn test_delete_plan_cascades() {
        let db = db_with_users().await;
        let plan = db.create_plan("alice", new_plan("Paris")).await.unwrap();
        let keep = db.create_plan("alice", new_plan("Rome")).await.unwrap();

        for i in 0..3 {
            db.create_activity("alice", new_activity(&plan.id, &format!("a{}", i), 1, "09:00"))
                .await
                .unwrap();
        }
        for day in 1..=2 {
            db.create_expense("alice", new_expense(&plan.id, day)).await.unwrap();
        }
        db.create_expense("alice", new_expense(&keep.id, 1)).await.unwrap();

        let deletion = db.delete_plan("alice", &plan.id).await.unwrap().into_option().unwrap();
        assert_eq!(
            deletion,
            PlanDeletion {
                activities: 3,
                expenses: 2
            }
        );

        for table in ["activities", "expenses"] {
            let sql = format!("SELECT COUNT(*) FROM {} WHERE plan_id = ?", table);
            let remaining: i64 = sqlx::query_scalar(&sql)
                .bind(&plan.id)
                .fetch_one(&db.pool)
                .await
                .unwrap();
            assert_eq!(remaining, 0, "{} left behind", table);
        }
        assert_eq!(
            db.list_expenses("alice", &keep.id).await.unwrap().into_option().unwrap().len(),
            1
        );
        assert!(matches!(db.get_plan("alice", &plan.id).await.unwrap(), Lookup::NotFound));
    }

    #[tokio::test]
    async fn test_children_require_owned_plan() {
        let db = db_with_users().await;
        let plan = db.create_plan("alice", new_plan("Paris")).await.unwrap();

        assert!(matches!(
            db.create_activity("bob", new_activity(&plan.id, "x", 1, "09:00")).await.unwrap(),
            Lookup::NotFound
        ));
        assert!(matches!(
            db.create_expense("bob", new_expense(&plan.id, 1)).await.unwrap(),
            Lookup::NotFound
        ));
        assert!(matches!(
            db.create_expense("alice", new_expense("no-such-plan", 1)).await.unwrap(),
            Lookup::NotFound
        ));
        assert!(matches!(
            db.list_expenses("bob", &plan.id).await.unwrap(),
            Lookup::NotFound
        ));
    }

    #[tokio::test]
    async fn test_activity_update_and_delete() {
        let db = db_with_users().await;
        let plan = db.create_plan("alice", new_plan("Paris")).await.unwrap();
        let activity = db
            .create_activity("alice", new_activity(&plan.id, "Louvre", 1, "09:00"))
            .await
            .unwrap()
            .into_option()
            .unwrap();

        let patch = ActivityPatch {
            category: Some(ActivityCategory::Culture),
            day: Some(2),
            ..Default::default()
        };
        assert!(matches!(
            db.update_activity("bob", &activity.id, patch.clone()).await.unwrap(),
            Lookup::NotFound
        ));
        let updated = db
            .update_activity("alice", &activity.id, patch)
            .await
            .unwrap()
            .into_option()
            .unwrap();
        assert_eq!(updated.category, ActivityCategory::Culture);
        assert_eq!(updated.day, 2);
        assert_eq!(updated.name, "Louvre");

        assert!(matches!(
            db.delete_activity("bob", &activity.id).await.unwrap(),
            Lookup::NotFound
        ));
        assert!(matches!(
            db.delete_activity("alice", &activity.id).await.unwrap(),
            Lookup::Found(())
        ));
        assert!(matches!(
            db.delete_activity("alice", &activity.id).await.unwrap(),
            Lookup::NotFound
        ));
    }

    #[tokio::test]
    async fn test_activity_ordering() {
        let db = db_with_users().await;
        let plan = db.create_plan("alice", new_plan("Paris")).await.unwrap();
        for (name, day, slot) in [("c", 2, "09:00"), ("b", 1, "13:00"), ("a", 1, "09:00")] {
            db.create_activity("alice", new_activity(&plan.id, name, day, slot))
                .await
                .unwrap();
        }

        let activities = db.list_activities("alice", &plan.id).await.unwrap().into_option().unwrap();
        let names: Vec<_> = activities.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_expenses_ordered_by_date_desc() {
        let db = db_with_users().await;
        let plan = db.create_plan("alice", new_plan("Paris")).await.unwrap();
        for day in [2, 5, 3] {
            db.create_expense("alice", new_expense(&plan.id, day)).await.unwrap();
        }

        let expenses = db.list_expenses("alice", &plan.id).await.unwrap().into_option().unwrap();
        let days: Vec<_> = expenses.iter().map(|e| e.description.as_str()).collect();
        assert_eq!(days, vec!["day 5", "day 3", "day 2"]);
    }

    #[tokio::test]
    async fn test_expense_update_and_delete() {
        let db = db_with_users().await;
        let plan = db.create_plan("alice", new_plan("Paris")).await.unwrap();
        let expense = db
            .create_expense("alice", new_expense(&plan.id, 1))
            .await
            .unwrap()
            .into_option()
            .unwrap();

        let patch = ExpensePatch {
            amount: Some(40.0),
            ..Default::default()
        };
        assert!(matches!(
            db.update_expense("bob", &expense.id, patch.clone()).await.unwrap(),
            Lookup::NotFound
        ));
        let updated = db
            .update_expense("alice", &expense.id, patch)
            .await
            .unwrap()
            .into_option()
            .unwrap();
        assert_eq!(updated.amount, 40.0);
        assert_eq!(updated.created_at, expense.created_at);

        assert!(matches!(
            db.delete_expense("alice", &expense.id).await.unwrap(),
            Lookup::Found(())
        ));
        assert!(db.list_expenses("alice", &plan.id).await.unwrap().into_option().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_patch_cannot_reverse_dates() {
        let db = db_with_users().await;
        let plan = db.create_plan("alice", new_plan("Paris")).await.unwrap();

        let early_end = PlanPatch {
            end_date: NaiveDate::from_ymd_opt(2024, 12, 31),
            ..Default::default()
        };
        assert!(matches!(
            db.update_plan("alice", &plan.id, early_end).await,
            Err(AppError::BadRequest(_))
        ));

        let late_start = PlanPatch {
            start_date: NaiveDate::from_ymd_opt(2025, 2, 1),
            ..Default::default()
        };
        assert!(matches!(
            db.update_plan("alice", &plan.id, late_start).await,
            Err(AppError::BadRequest(_))
        ));
        assert_eq!(db.get_plan("alice", &plan.id).await.unwrap().into_option().unwrap(), plan);

        // Moving both ends together is fine
        let shifted = PlanPatch {
            start_date: NaiveDate::from_ymd_opt(2025, 2, 1),
            end_date: NaiveDate::from_ymd_opt(2025, 2, 6),
            ..Default::default()
        };
        let updated = db
            .update_plan("alice", &plan.id, shifted)
            .await
            .unwrap()
            .into_option()
            .unwrap();
        assert_eq!(updated.start_date, NaiveDate::from_ymd_opt(2025, 2, 1).unwrap());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_writes_on_file_database() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}", dir.path().join("planner.db").display());
        let db = Database::connect(&url, 5).await.unwrap();
        db.migrate().await.unwrap();
        add_users(&db).await;

        let alice_plan = db.create_plan("alice", new_plan("Paris")).await.unwrap();
        let bob_plan = db.create_plan("bob", new_plan("Rome")).await.unwrap();

        let mut tasks = Vec::new();
        for i in 0..40u32 {
            let db = db.clone();
            let alice_plan = alice_plan.id.clone();
            let bob_plan = bob_plan.id.clone();
            tasks.push(tokio::spawn(async move {
                db.create_expense("alice", new_expense(&alice_plan, i % 28 + 1))
                    .await?;
                db.create_activity("bob", new_activity(&bob_plan, &format!("a{}", i), 1, "09:00"))
                    .await?;
                let patch = PlanPatch {
                    total_cost: Some(f64::from(i)),
                    ..Default::default()
                };
                db.update_plan("bob", &bob_plan, patch).await.map(|_| ())
            }));
        }

        for task in tasks {
            task.await.unwrap().unwrap();
        }

        let expenses = db
            .list_expenses("alice", &alice_plan.id)
            .await
            .unwrap()
            .into_option()
            .unwrap();
        assert_eq!(expenses.len(), 40);
        let activities = db
            .list_activities("bob", &bob_plan.id)
            .await
            .unwrap()
            .into_option()
            .unwrap();
        assert_eq!(activities.len(), 40);
    }
}

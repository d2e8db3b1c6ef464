use mongodb::{Client, ClientSession, Collection};
use mongodb::bson::{self, doc, Document, oid::ObjectId};
use mongodb::options::{
    ClientOptions, FindOneAndUpdateOptions, FindOptions, IndexOptions, ReturnDocument, ServerApi,
    ServerApiVersion,
};
use mongodb::IndexModel;
use crate::config::AppConfig;
use crate::models::{
    AnalyticsSummary, ApiError, Booking, BookingStatus, BookingTotals, DecoratorProfile,
    EarningsSummary, Service, ServiceDemand, StatusCount, UpdateServiceRequest, UpsertUserRequest,
    User, UserRole,
};
use crate::utils::Pagination;
use futures_util::TryStreamExt;

/// Outcome of a reconciliation write. `AlreadyProcessed` means the same
/// payment intent was recorded before, so the write was skipped.
#[derive(Debug)]
pub enum PaymentWrite {
    Applied(Booking),
    AlreadyProcessed(Booking),
}

impl PaymentWrite {
    pub fn into_parts(self) -> (Booking, bool) {
        match self {
            PaymentWrite::Applied(booking) => (booking, false),
            PaymentWrite::AlreadyProcessed(booking) => (booking, true),
        }
    }
}

#[derive(Clone)]
pub struct MongoDBService {
    client: Client,
    users: Collection<User>,
    services: Collection<Service>,
    bookings: Collection<Booking>,
    decorators: Collection<DecoratorProfile>,
}

impl MongoDBService {
    pub async fn init(config: &AppConfig) -> Result<Self, mongodb::error::Error> {
        // Parse options and configure client
        let mut client_options = ClientOptions::parse(&config.mongodb_uri).await?;

        // Set the server API version to V1
        let server_api = ServerApi::builder()
            .version(ServerApiVersion::V1)
            .strict(true)
            .deprecation_errors(true)
            .build();
        client_options.server_api = Some(server_api);

        // Optional: Add timeout settings
        client_options.connect_timeout = Some(std::time::Duration::from_secs(10));
        client_options.server_selection_timeout = Some(std::time::Duration::from_secs(5));

        // Create client
        let client = Client::with_options(client_options)?;

        // Test connection
        client
            .database("admin")
            .run_command(doc! {"ping": 1}, None)
            .await?;

        log::info!("Successfully connected to MongoDB!");

        // Get database and collections
        let db = client.database(&config.database);
        let users = db.collection::<User>("users");
        let services = db.collection::<Service>("services");
        let bookings = db.collection::<Booking>("bookings");
        let decorators = db.collection::<DecoratorProfile>("decorators");

        // Create unique index for user email
        let options = IndexOptions::builder().unique(true).build();
        let email_model = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(options)
            .build();
        users.create_index(email_model, None).await?;

        // Unique sparse index on transactionId. Sparse so unpaid bookings
        // (which carry no transactionId at all) never collide; unique so the
        // same payment intent can only ever be recorded once.
        let transaction_options = IndexOptions::builder().unique(true).sparse(true).build();
        let transaction_model = IndexModel::builder()
            .keys(doc! { "transactionId": 1 })
            .options(transaction_options)
            .build();
        bookings.create_index(transaction_model, None).await?;

        // Compound index for customer booking listings
        let customer_model = IndexModel::builder()
            .keys(doc! { "customer.email": 1, "createdAt": -1 })
            .build();
        bookings.create_index(customer_model, None).await?;

        // Compound index for decorator project and workload queries
        let decorator_model = IndexModel::builder()
            .keys(doc! { "assignedDecorator.email": 1, "bookingStatus": 1 })
            .build();
        bookings.create_index(decorator_model, None).await?;

        // One decorator profile per user
        let profile_options = IndexOptions::builder().unique(true).build();
        let profile_model = IndexModel::builder()
            .keys(doc! { "userId": 1 })
            .options(profile_options)
            .build();
        decorators.create_index(profile_model, None).await?;

        Ok(Self { client, users, services, bookings, decorators })
    }

    // User methods

    /// Creates the user on first sign-in or refreshes `last_login` on any
    /// later one. A single upsert, so two concurrent first sign-ins cannot
    /// both insert.
    pub async fn upsert_user(&self, request: UpsertUserRequest) -> Result<User, ApiError> {
        if request.email.trim().is_empty() {
            return Err(ApiError::ValidationError("Email cannot be empty".to_string()));
        }

        let now = bson::DateTime::now();
        let mut insert_doc = doc! {
            "email": &request.email,
            "role": "customer",
            "created_at": now,
        };
        if let Some(name) = &request.name {
            insert_doc.insert("name", name);
        }
        if let Some(image) = &request.image {
            insert_doc.insert("image", image);
        }

        let update = doc! {
            "$set": { "last_login": now },
            "$setOnInsert": insert_doc,
        };
        let options = FindOneAndUpdateOptions::builder()
            .upsert(true)
            .return_document(ReturnDocument::After)
            .build();

        self.users
            .find_one_and_update(doc! { "email": &request.email }, update, options)
            .await
            .map_err(ApiError::DatabaseError)?
            .ok_or_else(|| ApiError::InternalError("User upsert returned no document".to_string()))
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, ApiError> {
        self.users
            .find_one(doc! { "email": email }, None)
            .await
            .map_err(ApiError::DatabaseError)
    }

    pub async fn get_user_by_id(&self, id: &ObjectId) -> Result<Option<User>, ApiError> {
        self.users
            .find_one(doc! { "_id": id }, None)
            .await
            .map_err(ApiError::DatabaseError)
    }

    /// Role of the user behind an email, read fresh on every authorization
    /// check so promotions and demotions take effect on the next request.
    pub async fn get_user_role(&self, email: &str) -> Result<Option<UserRole>, ApiError> {
        Ok(self.get_user_by_email(email).await?.map(|user| user.role))
    }

    pub async fn get_users_by_role(&self, role: UserRole) -> Result<Vec<User>, ApiError> {
        let options = FindOptions::builder().sort(doc! { "created_at": -1 }).build();
        self.users
            .find(doc! { "role": role.to_string() }, options)
            .await
            .map_err(ApiError::DatabaseError)?
            .try_collect()
            .await
            .map_err(ApiError::DatabaseError)
    }

    // Promotion and demotion. Both flip the user's role and mirror the
    // change into the decorators collection inside one transaction, so the
    // role and the profile can never drift apart.

    pub async fn promote_to_decorator(&self, user_id: &ObjectId) -> Result<DecoratorProfile, ApiError> {
        let user = self
            .get_user_by_id(user_id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("User with id {} not found", user_id)))?;

        let mut session = self
            .client
            .start_session(None)
            .await
            .map_err(ApiError::DatabaseError)?;
        session
            .start_transaction(None)
            .await
            .map_err(ApiError::DatabaseError)?;

        match self.apply_promotion(&user, &mut session).await {
            Ok(profile) => {
                session
                    .commit_transaction()
                    .await
                    .map_err(ApiError::DatabaseError)?;
                Ok(profile)
            }
            Err(e) => {
                if let Err(abort_err) = session.abort_transaction().await {
                    log::error!("Failed to abort promotion transaction: {}", abort_err);
                }
                Err(e)
            }
        }
    }

    async fn apply_promotion(
        &self,
        user: &User,
        session: &mut ClientSession,
    ) -> Result<DecoratorProfile, ApiError> {
        let user_id = user
            .id
            .ok_or_else(|| ApiError::InternalError("User document has no id".to_string()))?;

        self.users
            .update_one_with_session(
                doc! { "_id": user_id },
                doc! { "$set": { "role": "decorator" } },
                None,
                session,
            )
            .await
            .map_err(ApiError::DatabaseError)?;

        let mut profile_doc = doc! {
            "name": user.name.clone().unwrap_or_else(|| user.email.clone()),
            "email": &user.email,
            "role": "decorator",
        };
        if let Some(image) = &user.image {
            profile_doc.insert("imageURL", image);
        }
        let update = doc! {
            "$set": profile_doc,
            "$setOnInsert": { "createdAt": bson::DateTime::now() },
        };
        let options = FindOneAndUpdateOptions::builder()
            .upsert(true)
            .return_document(ReturnDocument::After)
            .build();

        self.decorators
            .find_one_and_update_with_session(doc! { "userId": user_id }, update, options, session)
            .await
            .map_err(ApiError::DatabaseError)?
            .ok_or_else(|| {
                ApiError::InternalError("Decorator profile upsert returned no document".to_string())
            })
    }

    pub async fn demote_to_customer(&self, user_id: &ObjectId) -> Result<User, ApiError> {
        if self.get_user_by_id(user_id).await?.is_none() {
            return Err(ApiError::NotFound(format!("User with id {} not found", user_id)));
        }

        let mut session = self
            .client
            .start_session(None)
            .await
            .map_err(ApiError::DatabaseError)?;
        session
            .start_transaction(None)
            .await
            .map_err(ApiError::DatabaseError)?;

        match self.apply_demotion(user_id, &mut session).await {
            Ok(user) => {
                session
                    .commit_transaction()
                    .await
                    .map_err(ApiError::DatabaseError)?;
                Ok(user)
            }
            Err(e) => {
                if let Err(abort_err) = session.abort_transaction().await {
                    log::error!("Failed to abort demotion transaction: {}", abort_err);
                }
                Err(e)
            }
        }
    }

    async fn apply_demotion(
        &self,
        user_id: &ObjectId,
        session: &mut ClientSession,
    ) -> Result<User, ApiError> {
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();
        let user = self
            .users
            .find_one_and_update_with_session(
                doc! { "_id": user_id },
                doc! { "$set": { "role": "customer" } },
                options,
                session,
            )
            .await
            .map_err(ApiError::DatabaseError)?
            .ok_or_else(|| ApiError::NotFound(format!("User with id {} not found", user_id)))?;

        // Deleting a missing profile matches zero documents, which keeps
        // demotion idempotent.
        self.decorators
            .delete_one_with_session(doc! { "userId": user_id }, None, session)
            .await
            .map_err(ApiError::DatabaseError)?;

        Ok(user)
    }

    pub async fn get_decorator_profiles(&self) -> Result<Vec<DecoratorProfile>, ApiError> {
        let options = FindOptions::builder().sort(doc! { "createdAt": -1 }).build();
        self.decorators
            .find(None, options)
            .await
            .map_err(ApiError::DatabaseError)?
            .try_collect()
            .await
            .map_err(ApiError::DatabaseError)
    }

    // Service methods

    pub async fn create_service(&self, mut service: Service) -> Result<Service, ApiError> {
        let result = self
            .services
            .insert_one(&service, None)
            .await
            .map_err(ApiError::DatabaseError)?;
        service.id = result.inserted_id.as_object_id();
        Ok(service)
    }

    pub async fn get_service_by_id(&self, id: &ObjectId) -> Result<Option<Service>, ApiError> {
        self.services
            .find_one(doc! { "_id": id }, None)
            .await
            .map_err(ApiError::DatabaseError)
    }

    pub async fn get_all_services(&self) -> Result<Vec<Service>, ApiError> {
        self.services
            .find(None, None)
            .await
            .map_err(ApiError::DatabaseError)?
            .try_collect()
            .await
            .map_err(ApiError::DatabaseError)
    }

    pub async fn filter_services(
        &self,
        search: Option<&str>,
        category: Option<&str>,
        sort: Option<&str>,
        page: &Pagination,
    ) -> Result<(Vec<Service>, u64), ApiError> {
        let filter = services_filter(search, category);
        let total = self
            .services
            .count_documents(filter.clone(), None)
            .await
            .map_err(ApiError::DatabaseError)?;

        let options = FindOptions::builder()
            .sort(cost_sort(sort))
            .skip(page.skip())
            .limit(page.limit)
            .build();
        let services = self
            .services
            .find(filter, options)
            .await
            .map_err(ApiError::DatabaseError)?
            .try_collect()
            .await
            .map_err(ApiError::DatabaseError)?;

        Ok((services, total))
    }

    pub async fn update_service(
        &self,
        id: &ObjectId,
        update: UpdateServiceRequest,
    ) -> Result<bool, ApiError> {
        // Build the update document based on provided fields
        let mut update_doc = doc! {};

        if let Some(name) = update.name {
            update_doc.insert("name", name);
        }
        if let Some(category) = update.category {
            update_doc.insert("category", category);
        }
        if let Some(description) = update.description {
            update_doc.insert("description", description);
        }
        if let Some(cost) = update.cost {
            update_doc.insert("cost", cost);
        }
        if let Some(unit) = update.unit {
            update_doc.insert("unit", unit);
        }
        if let Some(image) = update.image {
            update_doc.insert("image", image);
        }
        if let Some(rating) = update.rating {
            update_doc.insert("rating", rating);
        }

        if update_doc.is_empty() {
            return Err(ApiError::ValidationError("No fields to update".to_string()));
        }

        let result = self
            .services
            .update_one(doc! { "_id": id }, doc! { "$set": update_doc }, None)
            .await
            .map_err(ApiError::DatabaseError)?;
        Ok(result.matched_count > 0)
    }

    pub async fn delete_service(&self, id: &ObjectId) -> Result<bool, ApiError> {
        let result = self
            .services
            .delete_one(doc! { "_id": id }, None)
            .await
            .map_err(ApiError::DatabaseError)?;
        Ok(result.deleted_count > 0)
    }

    // Booking methods

    pub async fn create_booking(&self, mut booking: Booking) -> Result<Booking, ApiError> {
        let result = self
            .bookings
            .insert_one(&booking, None)
            .await
            .map_err(ApiError::DatabaseError)?;
        booking.id = result.inserted_id.as_object_id();
        Ok(booking)
    }

    /// An unpaid booking holding the same service, customer, date and
    /// location slot, if one exists.
    pub async fn find_unpaid_duplicate(
        &self,
        service_id: &str,
        customer_email: &str,
        booking_date: &str,
        location: &str,
    ) -> Result<Option<Booking>, ApiError> {
        let mut filter = booking_key_filter(service_id, customer_email, booking_date, location);
        filter.insert("payment", false);
        self.bookings
            .find_one(filter, None)
            .await
            .map_err(ApiError::DatabaseError)
    }

    pub async fn get_booking_by_id(&self, id: &ObjectId) -> Result<Option<Booking>, ApiError> {
        self.bookings
            .find_one(doc! { "_id": id }, None)
            .await
            .map_err(ApiError::DatabaseError)
    }

    pub async fn get_booking_by_transaction(
        &self,
        transaction_id: &str,
    ) -> Result<Option<Booking>, ApiError> {
        self.bookings
            .find_one(doc! { "transactionId": transaction_id }, None)
            .await
            .map_err(ApiError::DatabaseError)
    }

    pub async fn get_customer_bookings(
        &self,
        email: &str,
        status: Option<BookingStatus>,
        page: &Pagination,
    ) -> Result<(Vec<Booking>, u64), ApiError> {
        let filter = customer_bookings_filter(email, status);
        self.find_booking_page(filter, page).await
    }

    pub async fn get_all_bookings(
        &self,
        status: Option<BookingStatus>,
        payment: Option<bool>,
        page: &Pagination,
    ) -> Result<(Vec<Booking>, u64), ApiError> {
        let filter = admin_bookings_filter(status, payment);
        self.find_booking_page(filter, page).await
    }

    pub async fn get_decorator_bookings(
        &self,
        email: &str,
        status: Option<BookingStatus>,
        page: &Pagination,
    ) -> Result<(Vec<Booking>, u64), ApiError> {
        let filter = decorator_bookings_filter(email, status);
        self.find_booking_page(filter, page).await
    }

    async fn find_booking_page(
        &self,
        filter: Document,
        page: &Pagination,
    ) -> Result<(Vec<Booking>, u64), ApiError> {
        let total = self
            .bookings
            .count_documents(filter.clone(), None)
            .await
            .map_err(ApiError::DatabaseError)?;

        let options = FindOptions::builder()
            .sort(doc! { "createdAt": -1 })
            .skip(page.skip())
            .limit(page.limit)
            .build();
        let bookings = self
            .bookings
            .find(filter, options)
            .await
            .map_err(ApiError::DatabaseError)?
            .try_collect()
            .await
            .map_err(ApiError::DatabaseError)?;

        Ok((bookings, total))
    }

    /// Bookings a decorator is actively working on, newest first.
    pub async fn get_decorator_projects(&self, email: &str) -> Result<Vec<Booking>, ApiError> {
        let options = FindOptions::builder().sort(doc! { "createdAt": -1 }).build();
        self.bookings
            .find(working_projects_filter(email), options)
            .await
            .map_err(ApiError::DatabaseError)?
            .try_collect()
            .await
            .map_err(ApiError::DatabaseError)
    }

    /// Moves a booking one step along the fulfillment pipeline, but only
    /// for the decorator the booking is assigned to.
    pub async fn update_decorator_booking_status(
        &self,
        id: &ObjectId,
        next: BookingStatus,
        decorator_email: &str,
    ) -> Result<Booking, ApiError> {
        let booking = self
            .get_booking_by_id(id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Booking with id {} not found", id)))?;

        match &booking.assigned_decorator {
            Some(decorator) if decorator.email == decorator_email => {}
            _ => {
                return Err(ApiError::Forbidden {
                    reason: "Booking is assigned to a different decorator".to_string(),
                    role: UserRole::Decorator.to_string(),
                })
            }
        }

        self.apply_status_transition(&booking, next).await
    }

    async fn apply_status_transition(
        &self,
        booking: &Booking,
        next: BookingStatus,
    ) -> Result<Booking, ApiError> {
        let current = booking.booking_status;
        if !current.can_transition_to(next) {
            return Err(ApiError::InvalidTransition {
                from: current.to_string(),
                to: next.to_string(),
            });
        }

        let id = booking
            .id
            .ok_or_else(|| ApiError::InternalError("Booking document has no id".to_string()))?;

        // The filter pins the status we validated against, so a concurrent
        // update cannot sneak an illegal two-step move through.
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();
        let updated = self
            .bookings
            .find_one_and_update(
                doc! { "_id": id, "bookingStatus": current.as_str() },
                doc! { "$set": { "bookingStatus": next.as_str() } },
                options,
            )
            .await
            .map_err(ApiError::DatabaseError)?;

        match updated {
            Some(booking) => Ok(booking),
            None => {
                log::warn!(
                    "Booking {} changed status concurrently, rejecting move to {}",
                    id,
                    next
                );
                Err(ApiError::InvalidTransition {
                    from: current.to_string(),
                    to: next.to_string(),
                })
            }
        }
    }

    /// Assignment overrides whatever status the booking is in, including
    /// completed or cancelled. Admins use this to restart the pipeline.
    pub async fn assign_decorator(
        &self,
        id: &ObjectId,
        name: &str,
        email: &str,
    ) -> Result<Booking, ApiError> {
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();
        self.bookings
            .find_one_and_update(doc! { "_id": id }, assignment_update(name, email), options)
            .await
            .map_err(ApiError::DatabaseError)?
            .ok_or_else(|| ApiError::NotFound(format!("Booking with id {} not found", id)))
    }

    pub async fn delete_booking(&self, id: &ObjectId) -> Result<bool, ApiError> {
        let result = self
            .bookings
            .delete_one(doc! { "_id": id }, None)
            .await
            .map_err(ApiError::DatabaseError)?;
        Ok(result.deleted_count > 0)
    }

    /// Inserts a booking that is already paid. The unique sparse index on
    /// transactionId turns a replayed payment intent into a duplicate key
    /// error, which is mapped to `AlreadyProcessed` instead of a second row.
    pub async fn insert_paid_booking(&self, mut booking: Booking) -> Result<PaymentWrite, ApiError> {
        let transaction_id = booking.transaction_id.clone().ok_or_else(|| {
            ApiError::InternalError("Paid booking must carry a transaction id".to_string())
        })?;

        match self.bookings.insert_one(&booking, None).await {
            Ok(result) => {
                booking.id = result.inserted_id.as_object_id();
                Ok(PaymentWrite::Applied(booking))
            }
            Err(e) if is_duplicate_key_error(&e) => {
                let existing = self
                    .get_booking_by_transaction(&transaction_id)
                    .await?
                    .ok_or_else(|| {
                        ApiError::InternalError(
                            "Duplicate transaction id but no matching booking".to_string(),
                        )
                    })?;
                Ok(PaymentWrite::AlreadyProcessed(existing))
            }
            Err(e) => Err(ApiError::DatabaseError(e)),
        }
    }

    /// Marks the booking matching the composite key as paid. Replays of the
    /// same payment intent are reported as `AlreadyProcessed`; a different
    /// intent against an already-paid booking is rejected. When the session
    /// carried an authoritative amount, the booking price is corrected to it.
    pub async fn confirm_booking_payment(
        &self,
        service_id: &str,
        customer_email: &str,
        booking_date: &str,
        location: &str,
        transaction_id: &str,
        paid_amount: Option<f64>,
    ) -> Result<PaymentWrite, ApiError> {
        let filter = booking_key_filter(service_id, customer_email, booking_date, location);
        let existing = self
            .bookings
            .find_one(filter.clone(), None)
            .await
            .map_err(ApiError::DatabaseError)?
            .ok_or_else(|| {
                ApiError::NotFound("No booking matches this checkout session".to_string())
            })?;

        if existing.payment {
            return if existing.transaction_id.as_deref() == Some(transaction_id) {
                Ok(PaymentWrite::AlreadyProcessed(existing))
            } else {
                Err(ApiError::ValidationError(
                    "Booking is already paid with a different transaction".to_string(),
                ))
            };
        }

        let mut unpaid_filter = filter.clone();
        unpaid_filter.insert("payment", false);
        let update = payment_confirmation_update(transaction_id, paid_amount);
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();
        let updated = self
            .bookings
            .find_one_and_update(unpaid_filter, update, options)
            .await
            .map_err(ApiError::DatabaseError)?;

        match updated {
            Some(booking) => Ok(PaymentWrite::Applied(booking)),
            None => {
                // Lost a race with another confirmation of the same booking.
                let current = self
                    .bookings
                    .find_one(filter, None)
                    .await
                    .map_err(ApiError::DatabaseError)?
                    .ok_or_else(|| {
                        ApiError::NotFound("No booking matches this checkout session".to_string())
                    })?;
                if current.payment && current.transaction_id.as_deref() == Some(transaction_id) {
                    Ok(PaymentWrite::AlreadyProcessed(current))
                } else {
                    Err(ApiError::ValidationError(
                        "Booking is already paid with a different transaction".to_string(),
                    ))
                }
            }
        }
    }

    pub async fn get_payment_history(&self, email: &str) -> Result<Vec<Booking>, ApiError> {
        let filter = doc! { "customer.email": email, "payment": true };
        let options = FindOptions::builder().sort(doc! { "paymentDate": -1 }).build();
        self.bookings
            .find(filter, options)
            .await
            .map_err(ApiError::DatabaseError)?
            .try_collect()
            .await
            .map_err(ApiError::DatabaseError)
    }

    pub async fn count_decorator_bookings(
        &self,
        email: &str,
        statuses: &[BookingStatus],
    ) -> Result<u64, ApiError> {
        let names: Vec<&'static str> = statuses.iter().map(|s| s.as_str()).collect();
        let filter = doc! {
            "assignedDecorator.email": email,
            "bookingStatus": { "$in": names },
        };
        self.bookings
            .count_documents(filter, None)
            .await
            .map_err(ApiError::DatabaseError)
    }

    // Analytics methods

    pub async fn get_decorator_earnings(&self, email: &str) -> Result<EarningsSummary, ApiError> {
        let pipeline = vec![
            doc! { "$match": { "assignedDecorator.email": email } },
            doc! { "$group": {
                "_id": null,
                "totalEarnings": { "$sum": { "$cond": [
                    { "$and": [
                        { "$eq": ["$bookingStatus", "completed"] },
                        { "$eq": ["$payment", true] },
                    ]},
                    "$price",
                    0,
                ]}},
                "completedProjects": { "$sum": { "$cond": [
                    { "$eq": ["$bookingStatus", "completed"] }, 1, 0,
                ]}},
                "workingProjects": { "$sum": { "$cond": [
                    { "$in": ["$bookingStatus", working_status_names()] }, 1, 0,
                ]}},
            }},
            doc! { "$project": {
                "_id": 0,
                "totalEarnings": 1,
                "completedProjects": 1,
                "workingProjects": 1,
            }},
        ];

        let mut cursor = self
            .bookings
            .aggregate(pipeline, None)
            .await
            .map_err(ApiError::DatabaseError)?;
        match cursor.try_next().await.map_err(ApiError::DatabaseError)? {
            Some(doc) => bson::from_document(doc).map_err(|e| {
                ApiError::InternalError(format!("Failed to deserialize earnings summary: {}", e))
            }),
            None => Ok(EarningsSummary::default()),
        }
    }

    pub async fn get_analytics_summary(&self) -> Result<AnalyticsSummary, ApiError> {
        let pipeline = vec![
            doc! { "$group": {
                "_id": null,
                "totalBookings": { "$sum": 1 },
                "paidBookings": { "$sum": { "$cond": [{ "$eq": ["$payment", true] }, 1, 0] } },
                "totalRevenue": { "$sum": { "$cond": [{ "$eq": ["$payment", true] }, "$price", 0] } },
                "completedBookings": { "$sum": { "$cond": [{ "$eq": ["$bookingStatus", "completed"] }, 1, 0] } },
                "workingBookings": { "$sum": { "$cond": [{ "$in": ["$bookingStatus", working_status_names()] }, 1, 0] } },
                "cancelledBookings": { "$sum": { "$cond": [{ "$eq": ["$bookingStatus", "cancelled"] }, 1, 0] } },
            }},
            doc! { "$project": {
                "_id": 0,
                "totalBookings": 1,
                "paidBookings": 1,
                "totalRevenue": 1,
                "completedBookings": 1,
                "workingBookings": 1,
                "cancelledBookings": 1,
            }},
        ];

        let mut cursor = self
            .bookings
            .aggregate(pipeline, None)
            .await
            .map_err(ApiError::DatabaseError)?;
        let totals: BookingTotals = match cursor.try_next().await.map_err(ApiError::DatabaseError)? {
            Some(doc) => bson::from_document(doc).map_err(|e| {
                ApiError::InternalError(format!("Failed to deserialize booking totals: {}", e))
            })?,
            None => BookingTotals::default(),
        };

        let total_users = self
            .users
            .count_documents(None, None)
            .await
            .map_err(ApiError::DatabaseError)?;
        let total_services = self
            .services
            .count_documents(None, None)
            .await
            .map_err(ApiError::DatabaseError)?;
        let total_decorators = self
            .decorators
            .count_documents(None, None)
            .await
            .map_err(ApiError::DatabaseError)?;

        Ok(AnalyticsSummary {
            total_bookings: totals.total_bookings,
            paid_bookings: totals.paid_bookings,
            total_revenue: totals.total_revenue,
            completed_bookings: totals.completed_bookings,
            working_bookings: totals.working_bookings,
            cancelled_bookings: totals.cancelled_bookings,
            total_users,
            total_services,
            total_decorators,
        })
    }

    /// Booking and revenue totals per service, most booked first.
    pub async fn get_service_demand(&self) -> Result<Vec<ServiceDemand>, ApiError> {
        let pipeline = vec![
            doc! { "$group": {
                "_id": "$serviceName",
                "bookings": { "$sum": 1 },
                "revenue": { "$sum": { "$cond": [{ "$eq": ["$payment", true] }, "$price", 0] } },
            }},
            doc! { "$sort": { "bookings": -1 } },
            doc! { "$project": { "_id": 0, "serviceName": "$_id", "bookings": 1, "revenue": 1 } },
        ];

        let mut cursor = self
            .bookings
            .aggregate(pipeline, None)
            .await
            .map_err(ApiError::DatabaseError)?;
        let mut demand = Vec::new();
        while let Some(doc) = cursor.try_next().await.map_err(ApiError::DatabaseError)? {
            let row = bson::from_document(doc).map_err(|e| {
                ApiError::InternalError(format!("Failed to deserialize service demand: {}", e))
            })?;
            demand.push(row);
        }
        Ok(demand)
    }

    pub async fn get_status_distribution(&self) -> Result<Vec<StatusCount>, ApiError> {
        let pipeline = vec![
            doc! { "$group": { "_id": "$bookingStatus", "count": { "$sum": 1 } } },
            doc! { "$project": { "_id": 0, "status": "$_id", "count": 1 } },
            doc! { "$sort": { "count": -1 } },
        ];

        let mut cursor = self
            .bookings
            .aggregate(pipeline, None)
            .await
            .map_err(ApiError::DatabaseError)?;
        let mut counts = Vec::new();
        while let Some(doc) = cursor.try_next().await.map_err(ApiError::DatabaseError)? {
            let row = bson::from_document(doc).map_err(|e| {
                ApiError::InternalError(format!("Failed to deserialize status count: {}", e))
            })?;
            counts.push(row);
        }
        Ok(counts)
    }

}

fn is_duplicate_key_error(error: &mongodb::error::Error) -> bool {
    use mongodb::error::{ErrorKind, WriteFailure};
    matches!(
        error.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(write_error)) if write_error.code == 11000
    )
}

fn working_status_names() -> Vec<&'static str> {
    BookingStatus::WORKING.iter().map(|s| s.as_str()).collect()
}

/// Composite key used to find the booking a checkout session paid for.
fn booking_key_filter(
    service_id: &str,
    customer_email: &str,
    booking_date: &str,
    location: &str,
) -> Document {
    doc! {
        "serviceId": service_id,
        "customer.email": customer_email,
        "bookingDate": booking_date,
        "location": location,
    }
}

fn customer_bookings_filter(email: &str, status: Option<BookingStatus>) -> Document {
    let mut filter = doc! { "customer.email": email };
    if let Some(status) = status {
        filter.insert("bookingStatus", status.as_str());
    }
    filter
}

fn admin_bookings_filter(status: Option<BookingStatus>, payment: Option<bool>) -> Document {
    let mut filter = doc! {};
    if let Some(status) = status {
        filter.insert("bookingStatus", status.as_str());
    }
    if let Some(payment) = payment {
        filter.insert("payment", payment);
    }
    filter
}

fn decorator_bookings_filter(email: &str, status: Option<BookingStatus>) -> Document {
    let mut filter = doc! { "assignedDecorator.email": email };
    if let Some(status) = status {
        filter.insert("bookingStatus", status.as_str());
    }
    filter
}

fn working_projects_filter(email: &str) -> Document {
    doc! {
        "assignedDecorator.email": email,
        "bookingStatus": { "$in": working_status_names() },
    }
}

fn services_filter(search: Option<&str>, category: Option<&str>) -> Document {
    let mut filter = doc! {};
    if let Some(search) = search {
        if !search.trim().is_empty() {
            filter.insert("name", doc! { "$regex": search, "$options": "i" });
        }
    }
    if let Some(category) = category {
        if !category.trim().is_empty() {
            filter.insert("category", category);
        }
    }
    filter
}

fn cost_sort(order: Option<&str>) -> Option<Document> {
    match order {
        Some("asc") => Some(doc! { "cost": 1 }),
        Some("desc") => Some(doc! { "cost": -1 }),
        _ => None,
    }
}

/// Update applied when a pre-created booking is confirmed as paid. The
/// price the customer submitted at creation time is replaced by the amount
/// the payment provider actually charged, when that amount is known.
fn payment_confirmation_update(transaction_id: &str, paid_amount: Option<f64>) -> Document {
    let mut set = doc! {
        "payment": true,
        "transactionId": transaction_id,
        "paymentDate": bson::DateTime::now(),
    };
    if let Some(amount) = paid_amount {
        set.insert("price", amount);
    }
    doc! { "$set": set }
}

fn assignment_update(name: &str, email: &str) -> Document {
    doc! {
        "$set": {
            "assignedDecorator": { "name": name, "email": email },
            "bookingStatus": BookingStatus::Assigned.as_str(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_booking_key_filter_carries_all_four_fields() {
        let filter = booking_key_filter("abc123", "amina@example.com", "2025-09-12", "Dhaka");
        assert_eq!(filter.get_str("serviceId").unwrap(), "abc123");
        assert_eq!(filter.get_str("customer.email").unwrap(), "amina@example.com");
        assert_eq!(filter.get_str("bookingDate").unwrap(), "2025-09-12");
        assert_eq!(filter.get_str("location").unwrap(), "Dhaka");
    }

    #[test]
    fn test_customer_filter_adds_status_only_when_given() {
        let bare = customer_bookings_filter("amina@example.com", None);
        assert!(!bare.contains_key("bookingStatus"));

        let filtered = customer_bookings_filter("amina@example.com", Some(BookingStatus::Pending));
        assert_eq!(filtered.get_str("bookingStatus").unwrap(), "pending");
        assert_eq!(filtered.get_str("customer.email").unwrap(), "amina@example.com");
    }

    #[test]
    fn test_admin_filter_combinations() {
        assert!(admin_bookings_filter(None, None).is_empty());

        let by_payment = admin_bookings_filter(None, Some(true));
        assert_eq!(by_payment.get_bool("payment").unwrap(), true);

        let both = admin_bookings_filter(Some(BookingStatus::Completed), Some(false));
        assert_eq!(both.get_str("bookingStatus").unwrap(), "completed");
        assert_eq!(both.get_bool("payment").unwrap(), false);
    }

    #[test]
    fn test_working_projects_filter_covers_the_working_bucket() {
        let filter = working_projects_filter("nadia@example.com");
        let statuses = filter
            .get_document("bookingStatus")
            .unwrap()
            .get_array("$in")
            .unwrap();
        assert_eq!(statuses.len(), 5);
        assert!(statuses.iter().any(|s| s.as_str() == Some("assigned")));
        assert!(statuses.iter().any(|s| s.as_str() == Some("setup_in_progress")));
        assert!(!statuses.iter().any(|s| s.as_str() == Some("pending")));
        assert!(!statuses.iter().any(|s| s.as_str() == Some("completed")));
    }

    #[test]
    fn test_services_filter_search_uses_case_insensitive_regex() {
        let filter = services_filter(Some("floral"), None);
        let name = filter.get_document("name").unwrap();
        assert_eq!(name.get_str("$regex").unwrap(), "floral");
        assert_eq!(name.get_str("$options").unwrap(), "i");
    }

    #[test]
    fn test_services_filter_ignores_blank_params() {
        assert!(services_filter(Some("  "), None).is_empty());
        assert!(services_filter(None, Some("")).is_empty());
        let filter = services_filter(None, Some("wedding"));
        assert_eq!(filter.get_str("category").unwrap(), "wedding");
    }

    #[test]
    fn test_cost_sort_parses_direction() {
        assert_eq!(cost_sort(Some("asc")).unwrap().get_i32("cost").unwrap(), 1);
        assert_eq!(cost_sort(Some("desc")).unwrap().get_i32("cost").unwrap(), -1);
        assert!(cost_sort(Some("sideways")).is_none());
        assert!(cost_sort(None).is_none());
    }

    #[test]
    fn test_payment_confirmation_update_prefers_charged_amount() {
        let update = payment_confirmation_update("pi_1", Some(100.0));
        let set = update.get_document("$set").unwrap();
        assert_eq!(set.get_bool("payment").unwrap(), true);
        assert_eq!(set.get_str("transactionId").unwrap(), "pi_1");
        assert_eq!(set.get_f64("price").unwrap(), 100.0);
        assert!(set.contains_key("paymentDate"));

        let without_amount = payment_confirmation_update("pi_1", None);
        let set = without_amount.get_document("$set").unwrap();
        assert!(!set.contains_key("price"));
    }

    #[test]
    fn test_assignment_update_sets_decorator_and_status() {
        let update = assignment_update("Nadia", "nadia@example.com");
        let set = update.get_document("$set").unwrap();
        assert_eq!(set.get_str("bookingStatus").unwrap(), "assigned");
        let decorator = set.get_document("assignedDecorator").unwrap();
        assert_eq!(decorator.get_str("name").unwrap(), "Nadia");
        assert_eq!(decorator.get_str("email").unwrap(), "nadia@example.com");
    }
}

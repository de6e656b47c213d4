use utoipa::{OpenApi, openapi::OpenApi as OpenApiSpec};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        bookings::{BookingList, CreateBookingRequest},
        items::{
            CreateCommentRequest, CreateItemRequest, ItemDetails, ItemDetailsList, ItemList,
            UpdateItemRequest,
        },
        requests::{CreateItemRequestRequest, ItemRequestList},
        users::{BookingHistoryList, CreateUserRequest, UpdateUserRequest, UserList},
    },
    models::{
        Booking, BookingHistoryEntry, BookingShort, BookingState, BookingStatus, Comment, Item,
        ItemRequest, User,
    },
    response::{ApiResponse, Meta},
    routes::{bookings, health, items, params, requests, users},
};

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        users::create_user,
        users::list_users,
        users::get_user,
        users::update_user,
        users::delete_user,
        users::booking_history,
        items::create_item,
        items::update_item,
        items::get_item,
        items::list_owner_items,
        items::search_items,
        items::add_comment,
        bookings::create_booking,
        bookings::decide_booking,
        bookings::get_booking,
        bookings::list_booker_bookings,
        bookings::list_owner_bookings,
        requests::create_request,
        requests::list_own_requests,
        requests::list_other_requests,
        requests::get_request
    ),
    components(
        schemas(
            User,
            Item,
            Booking,
            BookingShort,
            BookingStatus,
            BookingState,
            BookingHistoryEntry,
            Comment,
            ItemRequest,
            CreateUserRequest,
            UpdateUserRequest,
            UserList,
            BookingHistoryList,
            CreateItemRequest,
            UpdateItemRequest,
            CreateCommentRequest,
            ItemDetails,
            ItemList,
            ItemDetailsList,
            CreateBookingRequest,
            BookingList,
            CreateItemRequestRequest,
            ItemRequestList,
            params::Pagination,
            params::BookingListQuery,
            params::SearchQuery,
            params::DecisionQuery,
            Meta,
            ApiResponse<User>,
            ApiResponse<Item>,
            ApiResponse<Booking>,
            ApiResponse<ItemDetails>,
            ApiResponse<ItemRequest>,
            ApiResponse<BookingList>
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Users", description = "User endpoints"),
        (name = "Items", description = "Item, search and comment endpoints"),
        (name = "Bookings", description = "Booking endpoints"),
        (name = "Requests", description = "Item request endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}

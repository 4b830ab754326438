use actix_web::{HttpResponse, Responder};

// Fixed reference data for enrolment forms.

const CLASS_LEVELS: [&str; 5] = ["Class 9", "Class 10", "Class 11", "Class 12", "Repeater"];
const BOARDS: [&str; 3] = ["CBSE", "ICSE", "State Board"];
const STREAMS: [&str; 3] = ["Science", "Commerce", "Arts"];

#[utoipa::path(
    get,
    path = "/api/class-levels",
    responses(
        (status = 200, description = "Class levels", body = [String], example = json!(["Class 9", "Class 10", "Class 11", "Class 12", "Repeater"]))
    ),
    tag = "Master Data"
)]
pub async fn class_levels() -> impl Responder {
    HttpResponse::Ok().json(CLASS_LEVELS)
}

#[utoipa::path(
    get,
    path = "/api/boards",
    responses(
        (status = 200, description = "Examination boards", body = [String], example = json!(["CBSE", "ICSE", "State Board"]))
    ),
    tag = "Master Data"
)]
pub async fn boards() -> impl Responder {
    HttpResponse::Ok().json(BOARDS)
}

#[utoipa::path(
    get,
    path = "/api/streams",
    responses(
        (status = 200, description = "Academic streams", body = [String], example = json!(["Science", "Commerce", "Arts"]))
    ),
    tag = "Master Data"
)]
pub async fn streams() -> impl Responder {
    HttpResponse::Ok().json(STREAMS)
}

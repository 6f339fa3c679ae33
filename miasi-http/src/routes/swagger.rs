use crate::handlers::{forms, systems};
use crate::models::{
    Advice, EquationResult, ErrorResponse, FieldInfo, FormsResponse, ListSystemsResponse,
    SubmissionOutcome, SubmissionPayload, SubmissionStatus, SystemDetailResponse,
};
use miasi_core::ErrorKind;
use miasi_core::catalog::{InputKind, SelectOption, System};

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        systems::list_systems,
        systems::get_system,
        forms::list_forms,
        forms::submit_form
    ),
    components(schemas(
        ListSystemsResponse,
        SystemDetailResponse,
        FormsResponse,
        FieldInfo,
        System,
        InputKind,
        SelectOption,
        SubmissionPayload,
        SubmissionOutcome,
        SubmissionStatus,
        EquationResult,
        Advice,
        ErrorResponse,
        ErrorKind
    )),
    tags(
        (name = "miasi", description = "Expert system advisor API")
    ),
    servers(
        (url = "http://localhost:3000/api/v1", description = "Local development server"),
    )
)]
pub struct ApiDoc;

pub(crate) mod descriptor;
pub(crate) mod inline;
pub(crate) mod serializer;
pub(crate) mod upload;

//! Backend attribute names and join types of the indexed documents

pub const ID: &str = "id";
pub const ID_STRING: &str = "idstring";
pub const ALL: &str = "all";
pub const NAME: &str = "name";
pub const NAME_SUGGEST: &str = "name.suggest";
pub const DESCRIPTION: &str = "description";
pub const STATUS: &str = "status";
pub const FOLDER: &str = "folder";
pub const CREATED: &str = "created";
pub const MODIFIED: &str = "modified";
pub const CREATOR: &str = "creator";
pub const READ: &str = "read";
pub const LICENSE: &str = "license";
pub const PID: &str = "pid";
pub const EMAIL: &str = "email";

pub const AUTHOR_FAMILYNAME: &str = "author.familyname";
pub const AUTHOR_GIVENNAME: &str = "author.givenname";
pub const AUTHOR_COMPLETENAME: &str = "author.completename";
pub const AUTHOR_ORGANIZATION: &str = "author.organization";
pub const AUTHORS_OF_COLLECTION: &str = "authorsOfCollection";
pub const ORGANIZATIONS_OF_COLLECTION: &str = "organizationsOfCollection";
pub const FAMILYNAME: &str = "familyname";
pub const GIVENNAME: &str = "givenname";
pub const ORGANIZATION: &str = "organization";

pub const INFO: &str = "info";
pub const INFO_LABEL: &str = "info.label";
pub const INFO_LABEL_EXACT: &str = "info.label.exact";
pub const INFO_TEXT: &str = "info.text";
pub const INFO_URL: &str = "info.url";

pub const METADATA: &str = "metadata";
pub const METADATA_INDEX: &str = "metadata.index";
pub const METADATA_TEXT: &str = "metadata.text";
pub const METADATA_EXACT: &str = "metadata.text.exact";
pub const METADATA_NAME: &str = "metadata.name";
pub const METADATA_TITLE: &str = "metadata.title";
pub const METADATA_NUMBER: &str = "metadata.number";
pub const METADATA_TIME: &str = "metadata.time";
pub const METADATA_URI: &str = "metadata.uri";
pub const METADATA_FAMILYNAME: &str = "metadata.familyname";
pub const METADATA_GIVENNAME: &str = "metadata.givenname";
pub const METADATA_LOCATION: &str = "metadata.location";

pub const CONTENT_FULLTEXT: &str = "content.fulltext";
pub const CONTENT_CHECKSUM: &str = "content.checksum";
pub const CONTENT_TECHNICAL: &str = "content.technical";
pub const CONTENT_TECHNICAL_NAME: &str = "content.technical.name";
pub const CONTENT_TECHNICAL_VALUE: &str = "content.technical.value";

/// Join attribute distinguishing parent documents from content children.
pub const JOIN_FIELD: &str = "joinField";

/// Child document holding file content.
pub const JOIN_CONTENT: &str = "content";
/// Parent document of an item: its collection.
pub const JOIN_FOLDERS: &str = "folders";

pub const NAME_SORT: &str = "name.sort";
pub const FILETYPE: &str = "filetype";
pub const SIZE: &str = "size";
pub const FILE_EXTENSION_SORT: &str = "fileextension.sort";
pub const CREATORS_SORT: &str = "creators.sort";
pub const COMPLETENAME_SORT: &str = "completename.sort";
